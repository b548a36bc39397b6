use bridge_traits::permissions::AccessKind;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// Access an application asks for, in protocol order.
///
/// `ReadWrite` expands to both read and write tokens.
///
/// # Examples
///
/// ```
/// use core_auth::OperationType;
///
/// assert_eq!(OperationType::from_ordinal(2).unwrap(), OperationType::ReadWrite);
/// assert!(OperationType::from_ordinal(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "i64")]
pub enum OperationType {
    Read = 0,
    Write = 1,
    ReadWrite = 2,
}

impl OperationType {
    pub const ALL: [OperationType; 3] = [
        OperationType::Read,
        OperationType::Write,
        OperationType::ReadWrite,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn from_ordinal(ordinal: i64) -> Result<Self, AuthError> {
        match ordinal {
            0 => Ok(OperationType::Read),
            1 => Ok(OperationType::Write),
            2 => Ok(OperationType::ReadWrite),
            other => Err(AuthError::UnknownOperationType(other)),
        }
    }

    /// Platform access kinds this operation needs.
    pub fn accesses(self) -> &'static [AccessKind] {
        match self {
            OperationType::Read => &[AccessKind::Read],
            OperationType::Write => &[AccessKind::Write],
            OperationType::ReadWrite => &[AccessKind::Read, AccessKind::Write],
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Read => "READ",
            OperationType::Write => "WRITE",
            OperationType::ReadWrite => "READ_WRITE",
        };
        f.write_str(name)
    }
}

impl From<OperationType> for u32 {
    fn from(operation: OperationType) -> Self {
        operation.ordinal()
    }
}

impl TryFrom<i64> for OperationType {
    type Error = AuthError;

    fn try_from(ordinal: i64) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal)
    }
}
