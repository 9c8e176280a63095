//! Domain models for Veil.
//!
//! This crate contains pure data structures representing the core
//! concepts in our application. Models have no business logic - they're
//! just data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure data structures
//! - **control-core**: Business logic operating on models
//! - **veil**: Application wiring everything together
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod advisory;
pub mod connection;
pub mod error_location;
pub mod ip_info;
pub mod settings;

pub use advisory::{Advisory, AdvisoryId, AdvisoryLifetime, AdvisoryStyle};
pub use connection::ConnectionState;
pub use error_location::ErrorLocation;
pub use ip_info::IpInfo;
pub use settings::{SettingKey, Theme};

#[cfg(test)]
mod tests;
