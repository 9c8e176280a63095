//! Bidirectional tagged-message transport to the background process.
//!
//! The `Channel` is the only shared mutable resource in the core:
//! multiple components send on it concurrently, and every component
//! demultiplexes its own inbound messages from a broadcast
//! subscription. The far side of the outbound queue is owned by the
//! transport bridge (or by a test double playing the background
//! process).

mod messages;
pub mod transport;

pub use messages::{Inbound, Outbound, SettingsRequest, TunnelCommand};

use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;

use tokio::sync::{broadcast, mpsc};

/// Outbound queue depth; sends beyond this apply backpressure.
const OUTBOUND_CAPACITY: usize = 32;

/// Inbound fan-out depth per subscriber before a slow consumer lags.
const INBOUND_CAPACITY: usize = 64;

/// Handle to the message transport, cheap to clone and share.
#[derive(Clone)]
pub struct Channel {
    outbound_tx: mpsc::Sender<Outbound>,
    inbound_tx: broadcast::Sender<Inbound>,
}

impl Channel {
    /// Create a channel plus the outbound receiver the transport bridge
    /// (or a test double) consumes.
    pub fn new() -> (Self, mpsc::Receiver<Outbound>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (inbound_tx, _) = broadcast::channel(INBOUND_CAPACITY);
        (
            Self {
                outbound_tx,
                inbound_tx,
            },
            outbound_rx,
        )
    }

    /// Send a message to the background process.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] once the transport bridge is
    /// gone. Callers do not retry; the failure is surfaced as-is.
    pub async fn send(&self, message: Outbound) -> Result<(), ChannelError> {
        self.outbound_tx
            .send(message)
            .await
            .map_err(|e| ChannelError::Closed {
                message: format!("transport bridge is gone: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Subscribe to messages arriving from the background process.
    pub fn subscribe(&self) -> broadcast::Receiver<Inbound> {
        self.inbound_tx.subscribe()
    }

    /// Inject a message as if the background process sent it. Used by
    /// the transport bridge and by tests.
    pub fn publish(&self, message: Inbound) {
        // A send error only means nobody is subscribed yet; that is not
        // a transport failure.
        let _ = self.inbound_tx.send(message);
    }
}
