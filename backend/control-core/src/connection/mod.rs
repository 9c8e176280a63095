//! Connection controller: the state machine owning tunnel intent.
//!
//! Three independently-arriving event streams meet here: user toggles,
//! background-process acknowledgements, and host connectivity. The
//! controller reconciles them into one [`ConnectionState`] without
//! races by serializing everything through an actor task:
//!
//! - User toggles and acknowledgements arrive on one mpsc queue and are
//!   processed sequentially.
//! - Connectivity is read as a guard at the moment a toggle is handled.
//! - State is published through a watch channel; the controller is the
//!   sole writer, everyone else reads consistent snapshots.
//!
//! There is deliberately no error state: an acknowledgement that never
//! arrives leaves the controller busy indefinitely. That is part of the
//! background process's contract, not recoverable here.

use crate::channel::{Channel, Inbound, Outbound, TunnelCommand};
use crate::error::channel::ChannelError;

use common::{ConnectionState, ErrorLocation};

use std::panic::Location;

use log::{error, info, warn};
use tokio::sync::{broadcast, mpsc, watch};

const EVENT_QUEUE_CAPACITY: usize = 16;

/// Events the controller actor reconciles. User intent and background
/// acknowledgements share one queue so mutations are serialized.
#[derive(Debug, Clone, Copy)]
enum ControllerEvent {
    Toggle,
    Started(bool),
    Stopped(bool),
}

/// Handle to the running controller. Cheap to clone.
#[derive(Clone)]
pub struct ConnectionController {
    event_tx: mpsc::Sender<ControllerEvent>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl ConnectionController {
    /// Spawn the controller actor and its acknowledgement forwarder.
    ///
    /// `online_rx` comes from the connectivity monitor and gates user
    /// toggles; acknowledgements are never gated.
    pub fn spawn(channel: Channel, online_rx: watch::Receiver<bool>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());

        tokio::spawn(forward_acknowledgements(
            channel.subscribe(),
            event_tx.clone(),
        ));
        tokio::spawn(controller_actor(event_rx, state_tx, channel, online_rx));

        Self { event_tx, state_rx }
    }

    /// Apply user intent: connect when disconnected, disconnect when
    /// connected, cancel when still connecting. A toggle while the host
    /// is offline does nothing; the advisory layer covers it.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] if the controller actor has died
    /// (should never happen).
    pub async fn toggle(&self) -> Result<(), ChannelError> {
        self.event_tx
            .send(ControllerEvent::Toggle)
            .await
            .map_err(|e| ChannelError::Closed {
                message: format!("controller actor died: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }
}

/// Turns tunnel acknowledgements from the Channel into controller
/// events. Settings responses are not ours and pass by untouched.
async fn forward_acknowledgements(
    mut inbound: broadcast::Receiver<Inbound>,
    event_tx: mpsc::Sender<ControllerEvent>,
) {
    loop {
        let event = match inbound.recv().await {
            Ok(Inbound::Started { started }) => ControllerEvent::Started(started),
            Ok(Inbound::Stopped { stopped }) => ControllerEvent::Stopped(stopped),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Acknowledgement stream lagged, {skipped} message(s) skipped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if event_tx.send(event).await.is_err() {
            break;
        }
    }
}

/// The controller actor. Owns the state and processes events
/// sequentially, which makes every transition race-free by design.
async fn controller_actor(
    mut event_rx: mpsc::Receiver<ControllerEvent>,
    state_tx: watch::Sender<ConnectionState>,
    channel: Channel,
    online_rx: watch::Receiver<bool>,
) {
    info!("Connection controller actor started");

    let mut state = ConnectionState::default();

    while let Some(event) = event_rx.recv().await {
        let next = match event {
            ControllerEvent::Toggle => {
                if !*online_rx.borrow() {
                    info!("Toggle ignored while host is offline");
                    continue;
                }

                match state {
                    ConnectionState::Disconnected => {
                        if send_command(&channel, TunnelCommand::Start).await.is_err() {
                            continue;
                        }
                        ConnectionState::Connecting
                    }
                    ConnectionState::Connecting | ConnectionState::Connected => {
                        // A toggle mid-connect is reinterpreted as a
                        // cancel, never a silent drop of user intent.
                        if send_command(&channel, TunnelCommand::Stop).await.is_err() {
                            continue;
                        }
                        ConnectionState::Disconnecting
                    }
                    ConnectionState::Disconnecting => {
                        info!("Toggle ignored, disconnect already in flight");
                        continue;
                    }
                }
            }

            ControllerEvent::Started(true) if state == ConnectionState::Connecting => {
                ConnectionState::Connected
            }
            ControllerEvent::Stopped(true) if state == ConnectionState::Disconnecting => {
                ConnectionState::Disconnected
            }

            ControllerEvent::Started(false) | ControllerEvent::Stopped(false) => {
                warn!("Background process reported a failed transition while {state}");
                continue;
            }
            ControllerEvent::Started(_) | ControllerEvent::Stopped(_) => {
                warn!("Ignoring acknowledgement that does not apply while {state}");
                continue;
            }
        };

        info!("Connection state: {state} -> {next}");
        state = next;
        let _ = state_tx.send(state);
    }

    warn!("Connection controller actor stopped - this should not happen during normal operation");
}

async fn send_command(channel: &Channel, command: TunnelCommand) -> Result<(), ChannelError> {
    channel
        .send(Outbound::Tunnel(command))
        .await
        .inspect_err(|e| error!("Failed to send tunnel command: {e}"))
}
