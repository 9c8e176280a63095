use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Failures surfaced to settings callers. A response arriving for a key
/// with no pending request is NOT one of these; it is logged and dropped.
#[derive(Debug, ThisError)]
pub enum SettingsError {
    /// The Channel failed while the request was pending. Never retried
    /// automatically; the caller must re-invoke.
    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    /// The demultiplexer task dropped the pending record without
    /// resolving it.
    #[error("Actor Gone: {message} {location}")]
    ActorGone {
        message: String,
        location: ErrorLocation,
    },
}
