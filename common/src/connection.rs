//! Tunnel connection lifecycle states.
//!
//! The connection controller in control-core is the sole writer of this
//! state; everything else observes it through a watch channel.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Lifecycle of the tunnel owned by the background process, as observed
/// from the control surface.
///
/// There is no error state: an acknowledgement that never arrives leaves
/// the controller busy indefinitely. The background process is assumed
/// reliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    /// True while a transition is in flight awaiting an acknowledgement.
    ///
    /// Surfaced to the UI as a combined loading flag.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Disconnecting
        )
    }

    /// True only for an established, acknowledged tunnel.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}

impl Display for ConnectionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
        };
        write!(formatter, "{label}")
    }
}
