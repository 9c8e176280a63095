//! Two-stage public IP and geolocation lookup.
//!
//! Triggered on transitions into `Connected`: stage one resolves the
//! caller's public IP, stage two geolocates it. Failure of either stage
//! is logged and leaves the prior result unchanged - no partial update.
//! A completion that lands after the tunnel state moved on is
//! discarded, and the published result is cleared when the tunnel
//! leaves `Connected`, so stale results cannot outlive their session.

use crate::error::location::LocationError;
use crate::{GEO_LOOKUP_URL, IP_LOOKUP_URL};

use common::{ConnectionState, ErrorLocation, IpInfo};

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;
use url::Url;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Stage one: `{"ip":"203.0.113.5"}`.
#[derive(Debug, Deserialize)]
struct PublicIpResponse {
    ip: String,
}

/// Stage two: `{"ip":"203.0.113.5","country_code2":"DE"}`. The country
/// code can be absent when the service does not recognize the IP.
#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    ip: String,
    country_code2: Option<String>,
}

/// Resolves the tunnel's exit location and publishes it as [`IpInfo`].
///
/// Cheap to clone; clones share the published result.
#[derive(Clone)]
pub struct LocationProbe {
    client: Client,
    ip_endpoint: Url,
    geo_endpoint: Url,
    info_tx: Arc<watch::Sender<Option<IpInfo>>>,
    connection_rx: watch::Receiver<ConnectionState>,
}

impl LocationProbe {
    /// Probe against the default public lookup services.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the HTTP client cannot be built.
    pub fn new(connection_rx: watch::Receiver<ConnectionState>) -> Result<Self, LocationError> {
        Self::with_endpoints(
            Url::parse(IP_LOOKUP_URL)?,
            Url::parse(GEO_LOOKUP_URL)?,
            connection_rx,
        )
    }

    /// Endpoint injection for tests against mocked services.
    pub fn with_endpoints(
        ip_endpoint: Url,
        geo_endpoint: Url,
        connection_rx: watch::Receiver<ConnectionState>,
    ) -> Result<Self, LocationError> {
        let client = Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        let (info_tx, _) = watch::channel(None);
        let info_tx = Arc::new(info_tx);

        tokio::spawn(clear_on_disconnect(
            connection_rx.clone(),
            Arc::clone(&info_tx),
        ));

        Ok(Self {
            client,
            ip_endpoint,
            geo_endpoint,
            info_tx,
            connection_rx,
        })
    }

    /// Last successfully resolved exit location, if any.
    pub fn current(&self) -> Option<IpInfo> {
        self.info_tx.borrow().clone()
    }

    /// Observe resolved locations.
    pub fn subscribe(&self) -> watch::Receiver<Option<IpInfo>> {
        self.info_tx.subscribe()
    }

    /// Kick off a lookup if the tunnel is connected and settled.
    ///
    /// Overlapping refreshes are permitted; the last one to resolve
    /// wins. There is no request tokening.
    pub fn refresh(&self) {
        if !self.connection_rx.borrow().is_connected() {
            return;
        }

        let probe = self.clone();
        tokio::spawn(async move {
            match probe.lookup().await {
                Ok(info) => probe.apply(info),
                Err(e) => warn!("IP location lookup failed, keeping previous result: {e}"),
            }
        });
    }

    /// Publish a completed lookup unless the tunnel state moved on
    /// while it was in flight.
    fn apply(&self, info: IpInfo) {
        if !self.connection_rx.borrow().is_connected() {
            info!("Discarding stale location result for {}", info.ip);
            return;
        }

        info!(
            "Exit location resolved: {} ({})",
            info.ip,
            info.country_code.as_deref().unwrap_or("unknown")
        );
        let _ = self.info_tx.send(Some(info));
    }

    async fn lookup(&self) -> Result<IpInfo, LocationError> {
        let public_ip = self.fetch_public_ip().await?;
        self.fetch_geolocation(&public_ip).await
    }

    async fn fetch_public_ip(&self) -> Result<String, LocationError> {
        let response = self.client.get(self.ip_endpoint.clone()).send().await?;

        if !response.status().is_success() {
            return Err(LocationError::Status {
                message: format!(
                    "public IP endpoint returned HTTP {}",
                    response.status().as_u16()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body: PublicIpResponse = response.json().await?;
        Ok(body.ip)
    }

    async fn fetch_geolocation(&self, public_ip: &str) -> Result<IpInfo, LocationError> {
        let mut url = self.geo_endpoint.clone();
        url.query_pairs_mut().append_pair("ip", public_ip);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LocationError::Status {
                message: format!(
                    "geolocation endpoint returned HTTP {}",
                    response.status().as_u16()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body: GeolocationResponse = response.json().await?;

        Ok(IpInfo {
            ip: body.ip,
            country_code: body.country_code2.map(|code| code.to_lowercase()),
        })
    }
}

/// Drop the published result the moment the tunnel leaves `Connected`.
/// A result from one session must never describe the exit of the next.
async fn clear_on_disconnect(
    mut connection_rx: watch::Receiver<ConnectionState>,
    info_tx: Arc<watch::Sender<Option<IpInfo>>>,
) {
    while connection_rx.changed().await.is_ok() {
        if !connection_rx.borrow_and_update().is_connected() {
            info_tx.send_if_modified(|info| info.take().is_some());
        }
    }
}
