//! # Authorization Module
//!
//! Maps what the application wants to do (read, write or both, over a set of
//! record types) onto the permission tokens the platform grants, and asks the
//! platform store whether those tokens are held.
//!
//! ## Overview
//!
//! - [`resolve_permissions`] is pure: the cross product of operations and
//!   record types, deduplicated into an ordered set of tokens.
//! - [`resolve_raw`] does the same from protocol ordinals and fails on any
//!   ordinal outside the enumerations instead of dropping it.
//! - [`AuthorizationManager`] checks and requests grants through the host's
//!   [`HealthStore`](bridge_traits::HealthStore).

pub mod error;
pub mod manager;
pub mod resolver;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::AuthorizationManager;
pub use resolver::{resolve_permissions, resolve_raw};
pub use types::OperationType;
