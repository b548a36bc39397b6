//! Device information exposed by the host.

/// Platform information trait
///
/// Answers the questions the bridge needs to decide whether the health
/// store can be used at all: OS release, SDK level and whether the provider
/// app is installed.
///
/// - **Android**: `Build.VERSION.RELEASE`, `Build.VERSION.SDK_INT`,
///   `HealthConnectClient.isAvailable`
/// - **Desktop**: static values from the desktop shims
pub trait PlatformInfo: Send + Sync {
    /// Human readable OS release, e.g. `"13"`.
    fn version_name(&self) -> String;

    /// Numeric SDK level, e.g. `33`.
    fn version_code(&self) -> i64;

    /// Whether the health provider app is installed and reachable.
    fn is_provider_installed(&self) -> bool;
}
