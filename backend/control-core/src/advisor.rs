//! Level-triggered advisory evaluation.
//!
//! The advisor is the composition point between the connection
//! controller, the connectivity monitor, the location probe, and the
//! notification mediator. On every relevant change it re-derives the
//! advisory set from the CURRENT composite state rather than from the
//! edge that woke it, so any interleaving of events converges to the
//! same advisories.
//!
//! The one edge-triggered action is the probe: only a transition into
//! `Connected` starts a lookup, otherwise a resolved result would
//! re-trigger the probe forever.

use crate::location::LocationProbe;
use crate::notify::{NotificationMediator, home_region_advisory, offline_advisory};
use crate::settings::SettingValueStore;

use common::{AdvisoryId, ConnectionState, IpInfo, Theme};

use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Spawn the advisor task. It runs until any of its inputs goes away.
pub fn spawn_advisor(
    connection_rx: watch::Receiver<ConnectionState>,
    online_rx: watch::Receiver<bool>,
    probe: LocationProbe,
    mediator: NotificationMediator,
    settings: SettingValueStore,
) -> JoinHandle<()> {
    tokio::spawn(advisor_loop(
        connection_rx,
        online_rx,
        probe,
        mediator,
        settings,
    ))
}

async fn advisor_loop(
    mut connection_rx: watch::Receiver<ConnectionState>,
    mut online_rx: watch::Receiver<bool>,
    probe: LocationProbe,
    mediator: NotificationMediator,
    settings: SettingValueStore,
) {
    info!("Advisor loop started");

    let mut info_rx = probe.subscribe();

    loop {
        let state = *connection_rx.borrow();
        let online = *online_rx.borrow();
        let exit_info = info_rx.borrow().clone();

        evaluate(state, online, exit_info, &mediator, &settings).await;

        tokio::select! {
            changed = connection_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if connection_rx.borrow().is_connected() {
                    probe.refresh();
                }
            }
            changed = online_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = info_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    warn!("Advisor loop stopped - this should not happen during normal operation");
}

/// Drive the mediator from one composite snapshot.
async fn evaluate(
    state: ConnectionState,
    online: bool,
    exit_info: Option<IpInfo>,
    mediator: &NotificationMediator,
    settings: &SettingValueStore,
) {
    // The home-region notice is only valid while actively connected
    // through an exit that resolved to the home region; every other
    // composite state clears it.
    match exit_info {
        Some(info) if state.is_connected() && info.is_home_region() => {
            let theme = current_theme(settings).await;
            mediator.show(home_region_advisory(theme)).await;
        }
        _ => mediator.dismiss(AdvisoryId::HomeRegion).await,
    }

    if online {
        mediator.dismiss(AdvisoryId::Offline).await;
    } else {
        let theme = current_theme(settings).await;
        mediator.show(offline_advisory(theme)).await;
    }
}

/// Theme for advisory styling; a failed read falls back to the default
/// rather than blocking the notice.
async fn current_theme(settings: &SettingValueStore) -> Theme {
    settings.theme().await.unwrap_or_else(|e| {
        warn!("Theme read failed, styling advisory with default: {e}");
        Theme::default()
    })
}
