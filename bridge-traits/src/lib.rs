//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the health bridge core and the
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that lives on the host side (Android Health Connect,
//! desktop shims for development and tests).
//!
//! ## Traits
//!
//! - [`HealthStore`](health::HealthStore) - Record queries, inserts and permission grants
//! - [`PlatformInfo`](device::PlatformInfo) - OS version and provider availability
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | Android  | host plugin adapter | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert SDK exceptions into `BridgeError` with an
//! actionable message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across
//! async tasks behind `Arc`.

pub mod device;
pub mod error;
pub mod health;
pub mod logging;
pub mod permissions;
pub mod records;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use device::PlatformInfo;
pub use health::HealthStore;
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use permissions::{AccessKind, PermissionToken};
pub use records::{
    HeartRateSample, InsertResult, PlatformRecord, PlatformRecordKind, RecordMetadata, TimeRange,
};
pub use time::{Clock, FixedClock, SystemClock};
