//! Advisory mediation with identity de-duplication.
//!
//! "Persistent until dismissed" is modeled as explicit state: the set of
//! active advisory ids. Showing an active id replaces its content in
//! place, dismissal is idempotent and order-independent. A rendering
//! layer observes the event stream; the active set is the source of
//! truth.

use common::{Advisory, AdvisoryId, AdvisoryLifetime, AdvisoryStyle, Theme};

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use tokio::sync::{Mutex, broadcast};

const EVENT_CAPACITY: usize = 32;

/// What happened to the active advisory set.
#[derive(Debug, Clone)]
pub enum AdvisoryEvent {
    /// Shown for the first time or replaced in place.
    Shown(Advisory),
    Dismissed(AdvisoryId),
}

/// Owns the active advisory set. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct NotificationMediator {
    active: Arc<Mutex<HashMap<AdvisoryId, Advisory>>>,
    event_tx: broadcast::Sender<AdvisoryEvent>,
}

impl NotificationMediator {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            active: Arc::new(Mutex::new(HashMap::new())),
            event_tx,
        }
    }

    /// Show an advisory. An already-active id is replaced in place so
    /// notices never stack.
    pub async fn show(&self, advisory: Advisory) {
        let mut active = self.active.lock().await;

        if active.insert(advisory.id, advisory.clone()).is_some() {
            info!("Advisory '{}' replaced in place", advisory.id);
        } else {
            info!("Advisory '{}' shown", advisory.id);
        }

        let _ = self.event_tx.send(AdvisoryEvent::Shown(advisory));
    }

    /// Dismiss by id. A no-op when the id is not active, no matter how
    /// many times it was shown before.
    pub async fn dismiss(&self, id: AdvisoryId) {
        let mut active = self.active.lock().await;

        if active.remove(&id).is_some() {
            info!("Advisory '{id}' dismissed");
            let _ = self.event_tx.send(AdvisoryEvent::Dismissed(id));
        }
    }

    /// Snapshot of currently active advisories.
    pub async fn active(&self) -> Vec<Advisory> {
        self.active.lock().await.values().cloned().collect()
    }

    pub async fn is_active(&self, id: AdvisoryId) -> bool {
        self.active.lock().await.contains_key(&id)
    }

    /// Observe shown/dismissed events, e.g. from a rendering layer.
    pub fn subscribe(&self) -> broadcast::Receiver<AdvisoryEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for NotificationMediator {
    fn default() -> Self {
        Self::new()
    }
}

/// Toast colors per theme, matching what the rendering layer expects.
fn toast_style(theme: Theme) -> AdvisoryStyle {
    match theme {
        Theme::Light => AdvisoryStyle {
            background: "#242424",
            foreground: "#F4F5FB",
        },
        Theme::Dark => AdvisoryStyle {
            background: "#535353",
            foreground: "#F4F5FB",
        },
    }
}

/// The standing warning that the exit landed in the tunnel service's
/// home region. Informational only; connection state is unaffected.
pub fn home_region_advisory(theme: Theme) -> Advisory {
    Advisory {
        id: AdvisoryId::HomeRegion,
        text: "Your exit IP resolved to the tunnel's home region: filtering is bypassed, \
               sanctions are not. You can change the exit location by switching the method \
               in settings."
            .to_string(),
        style: toast_style(theme),
        lifetime: AdvisoryLifetime::Persistent,
    }
}

/// The standing notice that the host has no network connectivity.
pub fn offline_advisory(theme: Theme) -> Advisory {
    Advisory {
        id: AdvisoryId::Offline,
        text: "You are not connected to the internet!".to_string(),
        style: toast_style(theme),
        lifetime: AdvisoryLifetime::Persistent,
    }
}
