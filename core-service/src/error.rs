use bridge_traits::BridgeError;
use core_auth::AuthError;
use core_records::{RecordError, RecordType};
use thiserror::Error;

/// Bridge error code for rejected arguments and values.
pub const CODE_INVALID_ARGUMENT: &str = "400";
/// Bridge error code for missing permissions.
pub const CODE_PERMISSION_DENIED: &str = "401";
/// Bridge error code for store and internal failures.
pub const CODE_INTERNAL: &str = "500";
pub const CODE_NOT_INSTALLED: &str = "NOT_INSTALLED";
pub const CODE_NOT_SUPPORTED: &str = "NOT_SUPPORTED";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(#[from] core_runtime::Error),

    #[error("Invalid argument {argument}: {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("Permissions not granted")]
    PermissionDenied { missing: Vec<String> },

    #[error("Health Connect APK not installed on device")]
    NotInstalled,

    #[error(
        "Health Connect not supported. current api level {current}, required api level >= {required}"
    )]
    NotSupported { current: i64, required: i64 },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Health store error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Total of {record_type} records overflows")]
    TotalOverflow { record_type: RecordType },

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CoreError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Code reported to the application for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument { .. } => CODE_INVALID_ARGUMENT,
            CoreError::PermissionDenied { .. } => CODE_PERMISSION_DENIED,
            CoreError::NotInstalled => CODE_NOT_INSTALLED,
            CoreError::NotSupported { .. } => CODE_NOT_SUPPORTED,
            CoreError::Record(err) => record_code(err),
            CoreError::Auth(AuthError::Record(err)) => record_code(err),
            CoreError::Auth(AuthError::UnknownOperationType(_)) => CODE_INVALID_ARGUMENT,
            CoreError::Auth(AuthError::Bridge(_))
            | CoreError::Bridge(_)
            | CoreError::TotalOverflow { .. }
            | CoreError::Encode(_)
            | CoreError::InitializationFailed(_) => CODE_INTERNAL,
        }
    }

    /// Extra detail for the application, when there is any.
    pub fn details(&self) -> Option<String> {
        match self {
            CoreError::PermissionDenied { missing } if !missing.is_empty() => {
                Some(format!("request permissions needed: {}", missing.join(", ")))
            }
            CoreError::PermissionDenied { .. } => Some("request permissions needed".to_string()),
            _ => None,
        }
    }
}

// Records read back from the store that do not decode are the store's fault
fn record_code(err: &RecordError) -> &'static str {
    match err {
        RecordError::UnknownRecordType(_)
        | RecordError::ValueParse { .. }
        | RecordError::InvalidTimeRange { .. } => CODE_INVALID_ARGUMENT,
        RecordError::RecordKindMismatch { .. } | RecordError::MalformedRecord { .. } => {
            CODE_INTERNAL
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
