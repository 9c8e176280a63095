//! Test helpers for the control-core integration tests.
//!
//! `spawn_background` is the stand-in for the privileged background
//! process: it answers settings requests from an in-memory map and
//! acknowledges tunnel commands immediately. The wiremock helpers stand
//! in for the two public lookup services.

use control_core::channel::{Channel, Inbound, Outbound, SettingsRequest, TunnelCommand};
use control_core::notify::AdvisoryEvent;

use common::{Advisory, AdvisoryId, ConnectionState, SettingKey};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type SettingsMap = Arc<Mutex<HashMap<SettingKey, Value>>>;

const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// Spawn the background-process double. Returns the settings map so
/// tests can seed or inspect stored values.
pub fn spawn_background(channel: Channel, mut outbound_rx: mpsc::Receiver<Outbound>) -> SettingsMap {
    let values: SettingsMap = Arc::new(Mutex::new(HashMap::new()));
    let store = Arc::clone(&values);

    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            match message {
                Outbound::Settings(SettingsRequest::Get { key }) => {
                    let value = store.lock().await.get(&key).cloned();
                    channel.publish(Inbound::Settings { key, value });
                }
                Outbound::Settings(SettingsRequest::Set { key, value }) => {
                    store.lock().await.insert(key, value.clone());
                    channel.publish(Inbound::Settings {
                        key,
                        value: Some(value),
                    });
                }
                Outbound::Tunnel(TunnelCommand::Start) => {
                    channel.publish(Inbound::Started { started: true });
                }
                Outbound::Tunnel(TunnelCommand::Stop) => {
                    channel.publish(Inbound::Stopped { stopped: true });
                }
            }
        }
    });

    values
}

/// Mock the two lookup services. Stage one answers with `ip`, stage two
/// geolocates it to `country_code2` (absent when `None`).
pub async fn mock_lookup_services(
    ip: &str,
    country_code2: Option<&str>,
) -> (MockServer, Url, Url) {
    let server = MockServer::start().await;
    mount_lookup_mocks(&server, ip, country_code2).await;

    let ip_endpoint = Url::parse(&format!("{}/ip", server.uri())).unwrap();
    let geo_endpoint = Url::parse(&format!("{}/geo", server.uri())).unwrap();
    (server, ip_endpoint, geo_endpoint)
}

/// Mount (or remount, after a reset) the lookup responses on a server.
/// Lets a test change the simulated exit between sessions.
pub async fn mount_lookup_mocks(server: &MockServer, ip: &str, country_code2: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": ip })))
        .mount(server)
        .await;

    let geolocation_body = match country_code2 {
        Some(code) => json!({ "ip": ip, "country_code2": code }),
        None => json!({ "ip": ip }),
    };
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geolocation_body))
        .mount(server)
        .await;
}

pub async fn wait_for_state(rx: &mut watch::Receiver<ConnectionState>, expected: ConnectionState) {
    timeout(WAIT_LIMIT, rx.wait_for(|state| *state == expected))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for state {expected}"))
        .expect("state watch closed");
}

pub async fn wait_for_shown(
    events: &mut broadcast::Receiver<AdvisoryEvent>,
    id: AdvisoryId,
) -> Advisory {
    timeout(WAIT_LIMIT, async {
        loop {
            match events.recv().await.expect("advisory event stream closed") {
                AdvisoryEvent::Shown(advisory) if advisory.id == id => return advisory,
                _ => {}
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for advisory '{id}' to be shown"))
}

pub async fn wait_for_dismissed(events: &mut broadcast::Receiver<AdvisoryEvent>, id: AdvisoryId) {
    timeout(WAIT_LIMIT, async {
        loop {
            match events.recv().await.expect("advisory event stream closed") {
                AdvisoryEvent::Dismissed(dismissed) if dismissed == id => return,
                _ => {}
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for advisory '{id}' to be dismissed"))
}
