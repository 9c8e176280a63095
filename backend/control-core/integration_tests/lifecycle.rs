//! End-to-end scenarios across the whole control core: channel double,
//! controller, connectivity, probe (against mocked lookup services),
//! mediator, and advisor wired together the way the app shell does it.

use crate::helpers::{
    mock_lookup_services, mount_lookup_mocks, spawn_background, wait_for_dismissed,
    wait_for_shown, wait_for_state,
};

use control_core::advisor::spawn_advisor;
use control_core::channel::Channel;
use control_core::connection::ConnectionController;
use control_core::connectivity::{ConnectivityMonitor, HostSignal};
use control_core::location::LocationProbe;
use control_core::notify::NotificationMediator;
use control_core::settings::SettingValueStore;

use common::{AdvisoryId, ConnectionState};

use wiremock::MockServer;

struct Stack {
    controller: ConnectionController,
    monitor: ConnectivityMonitor,
    mediator: NotificationMediator,
    lookup_server: MockServer,
}

/// Wire the full stack against a background double and mocked lookup
/// services resolving to the given exit.
async fn build_stack(exit_ip: &str, country_code2: Option<&str>) -> Stack {
    let (lookup_server, ip_endpoint, geo_endpoint) =
        mock_lookup_services(exit_ip, country_code2).await;

    let (channel, outbound_rx) = Channel::new();
    spawn_background(channel.clone(), outbound_rx);

    let monitor = ConnectivityMonitor::new();
    let controller = ConnectionController::spawn(channel.clone(), monitor.subscribe());
    let settings = SettingValueStore::spawn(channel);
    let probe =
        LocationProbe::with_endpoints(ip_endpoint, geo_endpoint, controller.subscribe()).unwrap();
    let mediator = NotificationMediator::new();

    spawn_advisor(
        controller.subscribe(),
        monitor.subscribe(),
        probe,
        mediator.clone(),
        settings,
    );

    Stack {
        controller,
        monitor,
        mediator,
        lookup_server,
    }
}

/// **VALUE**: Verifies the full connect/disconnect round trip,
/// including the home-region advisory's lifecycle.
///
/// **WHY THIS MATTERS**: This is the composition the core exists for:
/// user intent, background acknowledgements, lookup results, and
/// advisory state all meeting without a race or a stuck state.
///
/// **BUG THIS CATCHES**: Would catch a probe that fires before the
/// connection settles, an advisory that survives disconnect, or an
/// acknowledgement lost between the channel and the controller actor.
#[tokio::test]
async fn given_home_region_exit_when_connecting_and_disconnecting_then_advisory_tracks_state() {
    let stack = build_stack("203.0.113.5", Some("IR")).await;
    let mut states = stack.controller.subscribe();
    let mut events = stack.mediator.subscribe();

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connected).await;

    let advisory = wait_for_shown(&mut events, AdvisoryId::HomeRegion).await;
    assert!(!advisory.text.is_empty());

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Disconnected).await;
    wait_for_dismissed(&mut events, AdvisoryId::HomeRegion).await;

    assert!(!stack.mediator.is_active(AdvisoryId::HomeRegion).await);
}

/// **VALUE**: Verifies a home-region result from one session cannot
/// resurrect the advisory in the next session through a foreign exit.
///
/// **WHY THIS MATTERS**: The probe's last result outlives the tunnel
/// unless it is cleared on disconnect. Reconnecting through a different
/// exit must be judged on fresh data, never on the previous session's.
///
/// **BUG THIS CATCHES**: Would catch a probe that keeps publishing the
/// old result across disconnect, or an advisor with no dismiss branch
/// for the connected-but-not-home composite state.
#[tokio::test]
async fn given_reconnect_through_foreign_exit_then_previous_home_region_advisory_stays_gone() {
    let stack = build_stack("203.0.113.5", Some("IR")).await;
    let mut states = stack.controller.subscribe();
    let mut events = stack.mediator.subscribe();

    // First session lands in the home region.
    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connected).await;
    wait_for_shown(&mut events, AdvisoryId::HomeRegion).await;

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Disconnected).await;
    wait_for_dismissed(&mut events, AdvisoryId::HomeRegion).await;

    // Second session resolves to a foreign exit.
    stack.lookup_server.reset().await;
    mount_lookup_mocks(&stack.lookup_server, "198.51.100.7", Some("DE")).await;

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connected).await;

    // Let the probe resolve and the advisor settle on the fresh result.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(
        !stack.mediator.is_active(AdvisoryId::HomeRegion).await,
        "home-region advisory must not survive into a foreign-exit session"
    );
}

#[tokio::test]
async fn given_foreign_exit_when_connected_then_no_home_region_advisory() {
    let stack = build_stack("198.51.100.7", Some("DE")).await;
    let mut states = stack.controller.subscribe();

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connected).await;

    // Give the probe and advisor time to do their work.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!stack.mediator.is_active(AdvisoryId::HomeRegion).await);
}

/// **VALUE**: Verifies the offline advisory appears and disappears with
/// host connectivity while the connection state stays untouched.
///
/// **WHY THIS MATTERS**: Connectivity and tunnel state have independent
/// lifecycles; an offline flip must never be confused with a tunnel
/// transition.
///
/// **BUG THIS CATCHES**: Would catch an advisor that tears down
/// connection state on offline, or an offline advisory that lingers
/// after connectivity returns.
#[tokio::test]
async fn given_connected_tunnel_when_host_goes_offline_and_back_then_advisory_flips_state_does_not()
{
    let stack = build_stack("198.51.100.7", Some("DE")).await;
    let mut states = stack.controller.subscribe();
    let mut events = stack.mediator.subscribe();

    stack.controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connected).await;

    stack.monitor.handle_signal(HostSignal::Offline);
    wait_for_shown(&mut events, AdvisoryId::Offline).await;
    assert_eq!(stack.controller.state(), ConnectionState::Connected);

    stack.monitor.handle_signal(HostSignal::Online);
    wait_for_dismissed(&mut events, AdvisoryId::Offline).await;
    assert_eq!(stack.controller.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn given_offline_host_when_toggled_then_advisory_shown_but_no_connection_attempt() {
    let stack = build_stack("198.51.100.7", Some("DE")).await;
    let mut events = stack.mediator.subscribe();

    stack.monitor.handle_signal(HostSignal::Offline);
    wait_for_shown(&mut events, AdvisoryId::Offline).await;

    stack.controller.toggle().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(stack.controller.state(), ConnectionState::Disconnected);
}
