//! Probe tests against mocked lookup services.

use crate::helpers::mock_lookup_services;

use control_core::location::LocationProbe;

use common::ConnectionState;

use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT_LIMIT: Duration = Duration::from_secs(2);

async fn wait_for_result(probe: &LocationProbe) -> common::IpInfo {
    let mut info_rx = probe.subscribe();
    timeout(WAIT_LIMIT, info_rx.wait_for(Option::is_some))
        .await
        .expect("timed out waiting for a lookup result")
        .expect("probe watch closed")
        .clone()
        .expect("wait_for guarantees a value")
}

#[tokio::test]
async fn given_home_region_exit_when_refreshed_then_result_classifies_as_home() {
    let (_server, ip_endpoint, geo_endpoint) = mock_lookup_services("203.0.113.5", Some("IR")).await;
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    let info = wait_for_result(&probe).await;

    assert_eq!(info.ip, "203.0.113.5");
    assert_eq!(info.country_code.as_deref(), Some("ir"));
    assert!(info.is_home_region());
}

#[tokio::test]
async fn given_unknown_country_when_refreshed_then_result_is_not_home() {
    let (_server, ip_endpoint, geo_endpoint) = mock_lookup_services("198.51.100.7", None).await;
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    let info = wait_for_result(&probe).await;

    assert_eq!(info.country_code, None);
    assert!(!info.is_home_region());
}

#[tokio::test]
async fn given_failing_ip_stage_when_refreshed_then_previous_result_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ip_endpoint = Url::parse(&format!("{}/ip", server.uri())).unwrap();
    let geo_endpoint = Url::parse(&format!("{}/geo", server.uri())).unwrap();
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(probe.current(), None, "a failed lookup must not publish anything");
}

#[tokio::test]
async fn given_failing_geolocation_stage_when_refreshed_then_no_partial_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ip": "203.0.113.5" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let ip_endpoint = Url::parse(&format!("{}/ip", server.uri())).unwrap();
    let geo_endpoint = Url::parse(&format!("{}/geo", server.uri())).unwrap();
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        probe.current(),
        None,
        "stage one alone must not surface as a result"
    );
}

#[tokio::test]
async fn given_disconnected_tunnel_when_refreshed_then_no_request_is_made() {
    let (server, ip_endpoint, geo_endpoint) = mock_lookup_services("203.0.113.5", Some("DE")).await;
    let (_state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(probe.current(), None);
    assert!(
        server.received_requests().await.unwrap().is_empty(),
        "a refresh outside Connected must not reach the network"
    );
}

#[tokio::test]
async fn given_resolved_result_when_tunnel_disconnects_then_published_result_is_cleared() {
    let (_server, ip_endpoint, geo_endpoint) = mock_lookup_services("203.0.113.5", Some("IR")).await;
    let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();
    let mut info_rx = probe.subscribe();

    probe.refresh();
    wait_for_result(&probe).await;

    state_tx.send(ConnectionState::Disconnected).unwrap();

    timeout(WAIT_LIMIT, info_rx.wait_for(Option::is_none))
        .await
        .expect("published result must be cleared on disconnect")
        .expect("probe watch closed");
    assert_eq!(probe.current(), None);
}

/// **VALUE**: Verifies a lookup that completes after the tunnel left
/// `Connected` is discarded rather than published.
///
/// **WHY THIS MATTERS**: Lookups race disconnects in normal use. A late
/// result that still lands would flip advisories back on for a tunnel
/// that is already down.
///
/// **BUG THIS CATCHES**: Would catch an `apply` that publishes without
/// re-checking the connection state it captured at refresh time.
#[tokio::test]
async fn given_disconnect_during_lookup_when_result_lands_then_it_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ip": "203.0.113.5" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ip": "203.0.113.5", "country_code2": "IR" })),
        )
        .mount(&server)
        .await;

    let ip_endpoint = Url::parse(&format!("{}/ip", server.uri())).unwrap();
    let geo_endpoint = Url::parse(&format!("{}/geo", server.uri())).unwrap();
    let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);
    let probe = LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, state_rx).unwrap();

    probe.refresh();
    // Disconnect while stage one is still delayed in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    state_tx.send(ConnectionState::Disconnected).unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(
        probe.current(),
        None,
        "a result landing after disconnect must be discarded"
    );
}
