//! Static platform description for desktop hosts

use bridge_traits::device::PlatformInfo;

/// SDK level reported by default; matches a current Android release.
pub const DESKTOP_VERSION_CODE: i64 = 34;

/// Platform information for desktop hosts.
///
/// Desktop has no SDK level or provider app, so the values are fixed at
/// construction. Tests use the setters to simulate older or incomplete
/// devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopPlatformInfo {
    version_name: String,
    version_code: i64,
    provider_installed: bool,
}

impl Default for DesktopPlatformInfo {
    fn default() -> Self {
        Self {
            version_name: format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH),
            version_code: DESKTOP_VERSION_CODE,
            provider_installed: true,
        }
    }
}

impl DesktopPlatformInfo {
    pub fn new(version_name: impl Into<String>, version_code: i64) -> Self {
        Self {
            version_name: version_name.into(),
            version_code,
            provider_installed: true,
        }
    }

    pub fn with_provider_installed(mut self, installed: bool) -> Self {
        self.provider_installed = installed;
        self
    }
}

impl PlatformInfo for DesktopPlatformInfo {
    fn version_name(&self) -> String {
        self.version_name.clone()
    }

    fn version_code(&self) -> i64 {
        self.version_code
    }

    fn is_provider_installed(&self) -> bool {
        self.provider_installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reports_installed_provider() {
        let info = DesktopPlatformInfo::default();
        assert_eq!(info.version_code(), DESKTOP_VERSION_CODE);
        assert!(info.is_provider_installed());
        assert!(info.version_name().contains(std::env::consts::OS));
    }

    #[test]
    fn test_custom_values() {
        let info = DesktopPlatformInfo::new("8.0", 26).with_provider_installed(false);
        assert_eq!(info.version_name(), "8.0");
        assert_eq!(info.version_code(), 26);
        assert!(!info.is_provider_installed());
    }
}
