//! Core service façade.
//!
//! This crate is the bridge dispatcher: it receives method channel calls
//! (a method name plus a loosely typed argument map), decodes them into
//! typed requests, consults availability and grants, and drives the
//! platform health store through the record marshaler.
//!
//! Desktop apps and tests typically enable the `desktop-shims` feature
//! (which depends on `bridge-desktop`) to get an in-memory SQLite store and
//! a static platform description without wiring anything by hand. Android
//! hosts inject their own [`HealthStore`](bridge_traits::HealthStore) and
//! [`PlatformInfo`](bridge_traits::PlatformInfo) through
//! [`CoreConfig`](core_runtime::CoreConfig).

pub mod availability;
pub mod error;
pub mod protocol;
pub mod response;
pub mod service;

pub use availability::{check_availability, ensure_available, Availability};
pub use error::{CoreError, Result};
pub use protocol::{Method, PermissionsRequest, ReadRequest, TotalsRequest, WriteRequest};
pub use response::MethodResponse;
pub use service::HealthConnectService;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{DesktopPlatformInfo, PermissionPolicy, SqliteHealthStore};
