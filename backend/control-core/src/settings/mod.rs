//! Request/response correlation for settings traffic.
//!
//! Settings responses from the background process carry only the key
//! they answer, so the store keeps an explicit queue of pending records
//! per key and resolves them from ONE shared demultiplexing subscription
//! to the Channel. Attaching a fresh subscription per call would leak
//! handlers and let stale calls re-resolve on unrelated later responses;
//! the pending queues are the guard against that.
//!
//! # Concurrency
//!
//! Requests for one key are answered in send order, so each response
//! settles the oldest pending record for its key. A call that repeats
//! the kind of the newest pending record joins it as a waiter instead of
//! sending a second identical message; a call of a different kind always
//! goes on the wire (a set behind a pending get must not be swallowed by
//! the get's response). The lock is held across the Channel send so a
//! waiter can never attach to a record whose message was not actually
//! sent.

use crate::channel::{Channel, Inbound, Outbound, SettingsRequest};
use crate::error::settings::SettingsError;

use common::{ErrorLocation, SettingKey, Theme};

use std::collections::{HashMap, VecDeque};
use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::{Mutex, broadcast, oneshot};

type SettingResult = Result<Option<Value>, SettingsError>;

/// Which operation opened a pending record. Identical consecutive calls
/// coalesce; differing kinds queue separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Get,
    Set,
}

/// Ephemeral correlation record. Destroyed on resolution or failure.
struct PendingRequest {
    kind: RequestKind,
    waiters: Vec<oneshot::Sender<SettingResult>>,
}

type PendingMap = Arc<Mutex<HashMap<SettingKey, VecDeque<PendingRequest>>>>;

/// Asynchronous read/write access to the background process's settings.
///
/// Cheap to clone; all clones share the pending queues and the single
/// demultiplexer task.
#[derive(Clone)]
pub struct SettingValueStore {
    channel: Channel,
    pending: PendingMap,
}

impl SettingValueStore {
    /// Create the store and spawn its demultiplexer task.
    pub fn spawn(channel: Channel) -> Self {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(demultiplex(channel.subscribe(), Arc::clone(&pending)));
        Self { channel, pending }
    }

    /// Read a setting. Resolves with `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Transport`] if the Channel failed while
    /// the request was pending. No retry is attempted.
    pub async fn get(&self, key: SettingKey) -> SettingResult {
        self.request(key, RequestKind::Get, SettingsRequest::Get { key })
            .await
    }

    /// Write a setting. Resolves with the acknowledged value.
    ///
    /// # Errors
    ///
    /// Same failure contract as [`SettingValueStore::get`].
    pub async fn set(&self, key: SettingKey, value: Value) -> SettingResult {
        self.request(key, RequestKind::Set, SettingsRequest::Set { key, value })
            .await
    }

    /// Read the display theme, applying the documented fallback when the
    /// read yields no value or an unrecognized one.
    pub async fn theme(&self) -> Result<Theme, SettingsError> {
        let stored = self.get(SettingKey::Theme).await?;

        Ok(match stored {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Unrecognized stored theme, falling back to default: {e}");
                Theme::default()
            }),
            None => Theme::default(),
        })
    }

    async fn request(
        &self,
        key: SettingKey,
        kind: RequestKind,
        request: SettingsRequest,
    ) -> SettingResult {
        let (waiter_tx, waiter_rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock().await;
            let queue = pending.entry(key).or_default();

            match queue.back_mut() {
                // Coalesce only with an identical newest record; a
                // repeated message would be redundant.
                Some(record) if record.kind == kind => {
                    debug!("Joining in-flight {kind:?} for key '{key}'");
                    record.waiters.push(waiter_tx);
                }
                // Anything else, including a different kind behind an
                // in-flight record, must still go on the wire.
                _ => {
                    queue.push_back(PendingRequest {
                        kind,
                        waiters: vec![waiter_tx],
                    });

                    if let Err(e) = self.channel.send(Outbound::Settings(request)).await {
                        queue.pop_back();
                        if queue.is_empty() {
                            pending.remove(&key);
                        }
                        return Err(SettingsError::Transport {
                            message: format!("failed to send settings request for '{key}': {e}"),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                }
            }
        }

        waiter_rx.await.map_err(|_| SettingsError::ActorGone {
            message: format!("pending record for '{key}' dropped without resolution"),
            location: ErrorLocation::from(Location::caller()),
        })?
    }
}

/// The single shared subscription that settles pending records.
///
/// The background process answers in send order, so each response
/// settles the oldest record for its key (all of its waiters); responses
/// for keys with nothing pending are logged and dropped, which is a
/// condition, not an error.
async fn demultiplex(mut inbound: broadcast::Receiver<Inbound>, pending: PendingMap) {
    debug!("Settings demultiplexer started");

    loop {
        match inbound.recv().await {
            Ok(Inbound::Settings { key, value }) => {
                let record = {
                    let mut pending = pending.lock().await;
                    match pending.get_mut(&key) {
                        Some(queue) => {
                            let record = queue.pop_front();
                            if queue.is_empty() {
                                pending.remove(&key);
                            }
                            record
                        }
                        None => None,
                    }
                };

                match record {
                    Some(record) => {
                        debug!(
                            "Settings response for '{key}' resolves {} waiter(s)",
                            record.waiters.len()
                        );
                        for waiter in record.waiters {
                            let _ = waiter.send(Ok(value.clone()));
                        }
                    }
                    None => warn!("Unmatched settings response for key '{key}', dropping"),
                }
            }

            // Tunnel acknowledgements belong to the connection controller.
            Ok(_) => {}

            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Settings demultiplexer lagged, {skipped} message(s) skipped");
            }

            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    // The Channel is gone; fail whatever is still waiting so callers
    // don't hang forever.
    info!("Settings demultiplexer stopping, failing remaining pending requests");
    let mut pending = pending.lock().await;
    for (key, queue) in pending.drain() {
        for record in queue {
            for waiter in record.waiters {
                let _ = waiter.send(Err(SettingsError::Transport {
                    message: format!("channel closed with '{key}' still pending"),
                    location: ErrorLocation::from(Location::caller()),
                }));
            }
        }
    }
}
