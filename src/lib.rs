//! Workspace placeholder crate.
//!
//! This crate exposes shared feature flags that map to the individual
//! workspace crates (`core-service` and the desktop shims it pulls in).
//! Host applications can depend on `health-connect-workspace` and enable the
//! documented features without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::{HealthConnectService, MethodResponse};
