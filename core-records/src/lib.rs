//! # Health Record Module
//!
//! Pure, synchronous core of the bridge: the closed set of record kinds, the
//! descriptor table that defines each kind, and the marshaler that moves
//! values between platform records and the generic transport entry.
//!
//! ## Overview
//!
//! This module manages:
//! - Stable protocol ordinals for record types and units
//! - Value shapes, units, temporality and valid ranges per record type
//! - Parsing and validation of raw values before any write
//! - Conversion of platform records into [`RecordEntry`] values
//!
//! Nothing here performs I/O or logs.

pub mod entry;
pub mod error;
pub mod marshal;
pub mod registry;
pub mod types;

pub use entry::RecordEntry;
pub use error::{RecordError, Result};
pub use marshal::{
    parse_value, to_platform_record, to_record_entries, to_record_entry, validate_time_range,
};
pub use registry::{
    descriptor, descriptors, platform_kind_of, record_type_for_kind, shape_of, temporality_of,
    unit_of, RecordDescriptor,
};
pub use types::{RecordType, RecordUnit, RecordValue, Temporality, ValueRange, ValueShape};
