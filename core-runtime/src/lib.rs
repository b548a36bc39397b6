//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the health bridge core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Every other core crate reads its bridges and settings from
//! [`config::CoreConfig`] and logs through the subscriber installed by
//! [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
