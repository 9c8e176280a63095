//! Resolved public IP and exit location.

use serde::{Deserialize, Serialize};

/// Country code of the tunnel service's home jurisdiction, lowercase.
///
/// An exit resolving here means the tunnel bypasses filtering but not
/// sanctions, which the user is warned about via a persistent advisory.
pub const HOME_REGION_CODE: &str = "ir";

/// Public IP of the current exit plus its geolocated country code.
///
/// `country_code` is `None` while unresolved; that is distinct from a
/// resolved code that simply isn't recognized by the flag renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip: String,
    pub country_code: Option<String>,
}

impl IpInfo {
    /// Whether the exit landed in the service's home region.
    pub fn is_home_region(&self) -> bool {
        self.country_code.as_deref() == Some(HOME_REGION_CODE)
    }
}
