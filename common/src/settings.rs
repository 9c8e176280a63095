//! Recognized setting keys and their typed values.
//!
//! The key set is closed: the background process only understands these
//! names, so an open string type would just defer typos to runtime.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Names of settings the background process can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKey {
    /// Display theme for the control surface.
    Theme,
    /// Tunnel method selection (affects which exit pool is used).
    Method,
}

impl Display for SettingKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            SettingKey::Theme => "theme",
            SettingKey::Method => "method",
        };
        write!(formatter, "{label}")
    }
}

/// Recognized values for [`SettingKey::Theme`].
///
/// The default is the documented fallback applied whenever a theme read
/// yields no stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}
