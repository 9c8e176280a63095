// Unit tests for the connection state machine
// Every transition in the table gets exercised, plus the guards: the
// offline gate, the cancel-in-flight path, and tolerance for
// acknowledgements that do not apply.

use crate::channel::{Channel, Inbound, Outbound, TunnelCommand};
use crate::connection::ConnectionController;

use common::ConnectionState;

use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

async fn wait_for_state(
    rx: &mut watch::Receiver<ConnectionState>,
    expected: ConnectionState,
) {
    timeout(Duration::from_secs(1), rx.wait_for(|state| *state == expected))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for state {expected}"))
        .expect("state watch closed");
}

#[tokio::test]
async fn given_disconnected_when_toggled_then_sends_start_and_enters_connecting() {
    let (channel, mut outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel, online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();

    wait_for_state(&mut states, ConnectionState::Connecting).await;
    assert_eq!(
        outbound_rx.recv().await.unwrap(),
        Outbound::Tunnel(TunnelCommand::Start)
    );
}

#[tokio::test]
async fn given_connecting_when_started_acknowledged_then_enters_connected() {
    let (channel, _outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connecting).await;

    channel.publish(Inbound::Started { started: true });
    wait_for_state(&mut states, ConnectionState::Connected).await;
}

/// **VALUE**: Verifies toggling mid-connect cancels instead of blocking
/// or jumping straight back to Disconnected.
///
/// **WHY THIS MATTERS**: The controller never blocks user intent while
/// busy, it reinterprets it: a toggle during `Connecting` must request
/// `stop` and wait for the acknowledgement like any other disconnect.
///
/// **BUG THIS CATCHES**: Would catch a cancel path that flips directly
/// to Disconnected without telling the background process, leaving the
/// tunnel up with the UI showing it down.
#[tokio::test]
async fn given_connecting_when_toggled_then_cancels_via_disconnecting() {
    let (channel, mut outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connecting).await;
    assert_eq!(
        outbound_rx.recv().await.unwrap(),
        Outbound::Tunnel(TunnelCommand::Start)
    );

    // Cancel before the start acknowledgement arrives.
    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Disconnecting).await;
    assert_eq!(
        outbound_rx.recv().await.unwrap(),
        Outbound::Tunnel(TunnelCommand::Stop)
    );

    channel.publish(Inbound::Stopped { stopped: true });
    wait_for_state(&mut states, ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn given_connected_when_toggled_then_sends_stop_and_enters_disconnecting() {
    let (channel, mut outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();
    channel.publish(Inbound::Started { started: true });
    wait_for_state(&mut states, ConnectionState::Connected).await;
    outbound_rx.recv().await.unwrap();

    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Disconnecting).await;
    assert_eq!(
        outbound_rx.recv().await.unwrap(),
        Outbound::Tunnel(TunnelCommand::Stop)
    );
}

#[tokio::test]
async fn given_offline_host_when_toggled_then_no_command_and_no_transition() {
    let (channel, mut outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(false);
    let controller = ConnectionController::spawn(channel, online_rx);

    controller.toggle().await.unwrap();
    sleep(Duration::from_millis(50)).await;

    assert!(matches!(outbound_rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(controller.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn given_disconnected_when_stray_acknowledgement_arrives_then_ignored() {
    let (channel, _outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);

    channel.publish(Inbound::Started { started: true });
    channel.publish(Inbound::Stopped { stopped: true });
    sleep(Duration::from_millis(50)).await;

    assert_eq!(controller.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn given_connecting_when_failed_start_reported_then_stays_busy() {
    // The background process reporting `started: false` is a non-event:
    // there is no error state, the controller stays busy.
    let (channel, _outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Connecting).await;

    channel.publish(Inbound::Started { started: false });
    sleep(Duration::from_millis(50)).await;

    assert_eq!(controller.state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn given_disconnecting_when_toggled_then_no_second_command() {
    let (channel, mut outbound_rx) = Channel::new();
    let (_online_tx, online_rx) = watch::channel(true);
    let controller = ConnectionController::spawn(channel.clone(), online_rx);
    let mut states = controller.subscribe();

    controller.toggle().await.unwrap();
    channel.publish(Inbound::Started { started: true });
    wait_for_state(&mut states, ConnectionState::Connected).await;
    controller.toggle().await.unwrap();
    wait_for_state(&mut states, ConnectionState::Disconnecting).await;

    // Drain the start/stop commands already sent.
    outbound_rx.recv().await.unwrap();
    outbound_rx.recv().await.unwrap();

    controller.toggle().await.unwrap();
    sleep(Duration::from_millis(50)).await;

    assert!(matches!(outbound_rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(controller.state(), ConnectionState::Disconnecting);
}
