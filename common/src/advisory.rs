//! User-visible advisory notices.
//!
//! Advisories are identity-deduplicated: showing an id that is already
//! active replaces its content instead of stacking a second notice.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Identity of an advisory. Two standing identities are reserved: the
/// home-region warning and the offline notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryId {
    /// The exit IP geolocated to the tunnel service's home region.
    HomeRegion,
    /// The host has no network connectivity.
    Offline,
}

impl Display for AdvisoryId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            AdvisoryId::HomeRegion => "home-region",
            AdvisoryId::Offline => "offline",
        };
        write!(formatter, "{label}")
    }
}

/// How long an advisory stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLifetime {
    /// Displayed until explicitly dismissed.
    Persistent,
    /// Displayed briefly, dismissed by the rendering layer on its own.
    Transient,
}

/// Rendering hints for an advisory. The actual rendering is external;
/// these mirror what the toast layer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvisoryStyle {
    pub background: &'static str,
    pub foreground: &'static str,
}

/// A deduplicated notice delivered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub id: AdvisoryId,
    pub text: String,
    pub style: AdvisoryStyle,
    pub lifetime: AdvisoryLifetime,
}
