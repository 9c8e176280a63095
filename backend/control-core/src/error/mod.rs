pub mod channel;
pub mod location;
pub mod settings;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Settings(#[from] settings::SettingsError),

    #[error(transparent)]
    Location(#[from] location::LocationError),
}
