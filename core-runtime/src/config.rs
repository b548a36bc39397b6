//! # Core Configuration Module
//!
//! Holds the bridges and settings the health bridge core runs with.
//!
//! ## Overview
//!
//! `CoreConfig` is built through [`CoreConfigBuilder`], which enforces
//! fail-fast validation so that a misconfigured host is reported at startup
//! rather than on the first request.
//!
//! ## Required Dependencies
//!
//! - `HealthStore` - The platform record store and permission controller
//! - `PlatformInfo` - OS release, SDK level and provider presence
//!
//! ## Optional Dependencies
//!
//! - `Clock` - Time source for default query windows (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, an in-memory SQLite
//! `HealthStore` and a static desktop `PlatformInfo` are injected when not
//! provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .health_store(Arc::new(MyHealthStore))
//!     .platform_info(Arc::new(MyPlatformInfo))
//!     .local_offset_minutes(120)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing bridges produce [`Error::CapabilityMissing`] with a message naming
//! what to inject; out-of-range settings produce [`Error::Config`].

use crate::error::{Error, Result};
use bridge_traits::{Clock, HealthStore, PlatformInfo, SystemClock};
use chrono::{FixedOffset, Offset, Utc};
use std::sync::Arc;

/// First SDK level with Health Connect support (Android 8.1).
pub const DEFAULT_MIN_SUPPORTED_SDK: i64 = 27;

/// Upper bound on records returned by one read.
pub const DEFAULT_MAX_RECORDS_PER_READ: usize = 10_000;

/// Largest UTC offset accepted for naive timestamps (±14 hours).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Core configuration for the health bridge.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform record store (required)
    pub health_store: Arc<dyn HealthStore>,

    /// Platform description used for availability checks (required)
    pub platform_info: Arc<dyn PlatformInfo>,

    /// Time source for "now" and "start of day"
    pub clock: Arc<dyn Clock>,

    /// Lowest SDK level on which the health store is considered supported
    pub min_supported_sdk: i64,

    /// Offset applied to timestamps sent without a zone
    pub local_offset_minutes: i32,

    /// Reads returning more records than this are truncated
    pub max_records_per_read: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("health_store", &"HealthStore { ... }")
            .field("platform_info", &"PlatformInfo { ... }")
            .field("clock", &"Clock { ... }")
            .field("min_supported_sdk", &self.min_supported_sdk)
            .field("local_offset_minutes", &self.local_offset_minutes)
            .field("max_records_per_read", &self.max_records_per_read)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The minimum SDK level is positive
    /// - The local offset is within ±14 hours
    /// - The read cap is between 1 and 1,000,000
    pub fn validate(&self) -> Result<()> {
        if self.min_supported_sdk < 1 {
            return Err(Error::Config(format!(
                "Minimum supported SDK must be at least 1, got {}",
                self.min_supported_sdk
            )));
        }

        if self.local_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(Error::Config(format!(
                "Local offset of {} minutes is outside ±{} minutes. \
                 Use .local_offset_minutes() with the device's UTC offset.",
                self.local_offset_minutes, MAX_OFFSET_MINUTES
            )));
        }

        if self.max_records_per_read == 0 {
            return Err(Error::Config(
                "Max records per read must be greater than 0".to_string(),
            ));
        }

        if self.max_records_per_read > 1_000_000 {
            return Err(Error::Config(
                "Max records per read exceeds maximum of 1,000,000".to_string(),
            ));
        }

        Ok(())
    }

    /// Offset used to interpret timestamps without a zone.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.local_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn health_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HealthStore".to_string(),
        message: "HealthStore implementation is required for record access. \
                 Android: inject the Health Connect client adapter. \
                 Desktop: enable the 'desktop-shims' feature to use the default SqliteHealthStore."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn platform_info_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlatformInfo".to_string(),
        message: "PlatformInfo implementation is required for availability checks. \
                 Android: inject Build.VERSION and provider status. \
                 Desktop: enable the 'desktop-shims' feature to use DesktopPlatformInfo."
            .to_string(),
    }
}

// The database opens on the first store call, on whichever runtime makes it
#[cfg(feature = "desktop-shims")]
fn provide_default_health_store() -> Result<Arc<dyn HealthStore>> {
    let store: Arc<dyn HealthStore> =
        Arc::new(bridge_desktop::SqliteHealthStore::lazy_in_memory());
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_health_store() -> Result<Arc<dyn HealthStore>> {
    Err(health_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_platform_info() -> Result<Arc<dyn PlatformInfo>> {
    let info: Arc<dyn PlatformInfo> = Arc::new(bridge_desktop::DesktopPlatformInfo::default());
    Ok(info)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_platform_info() -> Result<Arc<dyn PlatformInfo>> {
    Err(platform_info_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    health_store: Option<Arc<dyn HealthStore>>,
    platform_info: Option<Arc<dyn PlatformInfo>>,
    clock: Option<Arc<dyn Clock>>,
    min_supported_sdk: Option<i64>,
    local_offset_minutes: Option<i32>,
    max_records_per_read: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the platform health store (required).
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use core_runtime::config::CoreConfig;
    /// use std::sync::Arc;
    ///
    /// let builder = CoreConfig::builder()
    ///     .health_store(Arc::new(MyHealthStore));
    /// ```
    pub fn health_store(mut self, store: Arc<dyn HealthStore>) -> Self {
        self.health_store = Some(store);
        self
    }

    /// Sets the platform information source (required).
    pub fn platform_info(mut self, info: Arc<dyn PlatformInfo>) -> Self {
        self.platform_info = Some(info);
        self
    }

    /// Sets the time source.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the lowest supported SDK level.
    ///
    /// Default: 27 (Android 8.1)
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().min_supported_sdk(28);
    /// ```
    pub fn min_supported_sdk(mut self, sdk: i64) -> Self {
        self.min_supported_sdk = Some(sdk);
        self
    }

    /// Sets the UTC offset, in minutes, for timestamps sent without a zone.
    ///
    /// Default: 0
    pub fn local_offset_minutes(mut self, minutes: i32) -> Self {
        self.local_offset_minutes = Some(minutes);
        self
    }

    /// Sets the cap on records returned by one read.
    ///
    /// Default: 10,000
    pub fn max_records_per_read(mut self, max: usize) -> Self {
        self.max_records_per_read = Some(max);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when a required bridge is missing and
    ///   no desktop default is available
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let platform_info = match self.platform_info {
            Some(info) => info,
            None => provide_default_platform_info()?,
        };

        let health_store = match self.health_store {
            Some(store) => store,
            None => provide_default_health_store()?,
        };

        let config = CoreConfig {
            health_store,
            platform_info,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            min_supported_sdk: self.min_supported_sdk.unwrap_or(DEFAULT_MIN_SUPPORTED_SDK),
            local_offset_minutes: self.local_offset_minutes.unwrap_or(0),
            max_records_per_read: self
                .max_records_per_read
                .unwrap_or(DEFAULT_MAX_RECORDS_PER_READ),
        };

        config.validate()?;

        Ok(config)
    }
}
