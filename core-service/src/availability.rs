//! Health store availability
//!
//! Availability is recomputed from the platform on every call; nothing is
//! cached between requests.

use bridge_traits::PlatformInfo;
use serde::Serialize;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Installed,
    /// SDK is recent enough but the provider app is missing
    NotInstalled,
    /// SDK below the supported minimum
    NotSupported,
}

/// Ask the platform whether the health store can be used.
///
/// An installed provider wins over the SDK check, matching how the platform
/// client reports itself.
pub fn check_availability(platform: &dyn PlatformInfo, min_sdk: i64) -> Availability {
    if platform.is_provider_installed() {
        Availability::Installed
    } else if platform.version_code() >= min_sdk {
        Availability::NotInstalled
    } else {
        Availability::NotSupported
    }
}

/// Fail with the matching error unless the store is installed.
pub fn ensure_available(platform: &dyn PlatformInfo, min_sdk: i64) -> Result<()> {
    match check_availability(platform, min_sdk) {
        Availability::Installed => Ok(()),
        Availability::NotInstalled => Err(CoreError::NotInstalled),
        Availability::NotSupported => Err(CoreError::NotSupported {
            current: platform.version_code(),
            required: min_sdk,
        }),
    }
}
