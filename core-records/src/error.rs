use bridge_traits::records::PlatformRecordKind;
use thiserror::Error;

use crate::types::RecordType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("Cannot parse value {raw:?} for {record_type}: {reason}")]
    ValueParse {
        record_type: RecordType,
        raw: String,
        reason: String,
    },

    #[error("Invalid time range for {record_type}: {reason}")]
    InvalidTimeRange {
        record_type: RecordType,
        reason: String,
    },

    #[error("Record kind mismatch: expected {expected}, found {found}")]
    RecordKindMismatch {
        expected: PlatformRecordKind,
        found: PlatformRecordKind,
    },

    #[error("Malformed {record_type} record: {reason}")]
    MalformedRecord {
        record_type: RecordType,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, RecordError>;
