//! Host network reachability tracking.
//!
//! A two-state signal independent of the tunnel: the host either has
//! network connectivity or it does not. The monitor starts optimistic
//! (`online = true`) regardless of actual host state at boot and is
//! driven by host-level reachability signals.

use log::info;
use tokio::sync::watch;

/// Edge events delivered by the host environment. No payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    Online,
    Offline,
}

/// Tracks whether the host can reach the network at all.
pub struct ConnectivityMonitor {
    online_tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Starts optimistic: the host is assumed online until a signal
    /// says otherwise.
    pub fn new() -> Self {
        let (online_tx, _) = watch::channel(true);
        Self { online_tx }
    }

    pub fn online(&self) -> bool {
        *self.online_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }

    /// Apply a host reachability signal.
    ///
    /// Always notifies observers, even when the value is unchanged:
    /// duplicate raw signals are allowed to re-fire since consumers
    /// de-duplicate advisories by id.
    pub fn handle_signal(&self, signal: HostSignal) {
        let online = matches!(signal, HostSignal::Online);
        info!("Host connectivity signal: {signal:?}");
        let _ = self.online_tx.send(online);
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
