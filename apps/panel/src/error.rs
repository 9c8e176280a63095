use common::ErrorLocation;

use thiserror::Error;

/// Errors surfaced by the panel shell itself.
///
/// Core-layer errors cross into the shell as formatted messages; the
/// shell keeps structured location tracking for its own failures.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Error from this app's own setup and I/O
    #[error("Panel Error: {message} {location}")]
    Panel {
        message: String,
        location: ErrorLocation,
    },

    /// Error from control-core operations (channel, settings, lookup)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}
