//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop hosts (macOS,
//! Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! - `HealthStore` using SQLite through `sqlx`, file-backed or in-memory
//! - `PlatformInfo` with fixed, configurable values
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopPlatformInfo, SqliteHealthStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteHealthStore::in_memory().await.unwrap();
//!     let platform = DesktopPlatformInfo::default();
//!
//!     // Use in core configuration
//! }
//! ```

mod platform;
mod store;

pub use platform::{DesktopPlatformInfo, DESKTOP_VERSION_CODE};
pub use store::{PermissionPolicy, SqliteHealthStore};
