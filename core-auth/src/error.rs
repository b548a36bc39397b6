use bridge_traits::error::BridgeError;
use core_records::RecordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Unknown operation type: {0}")]
    UnknownOperationType(i64),

    #[error("Permission controller failed: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
