//! Platform permission tokens
//!
//! A token is the unit the platform grants: read or write access to one
//! record kind. Tokens are ordered so permission sets iterate deterministically.

use crate::records::PlatformRecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every Health Connect permission string.
pub const PERMISSION_PREFIX: &str = "android.permission.health.";

/// Access level carried by a permission token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "READ",
            AccessKind::Write => "WRITE",
        }
    }
}

/// Opaque platform grant for one (access, record kind) pair.
///
/// # Examples
///
/// ```
/// use bridge_traits::permissions::{AccessKind, PermissionToken};
/// use bridge_traits::records::PlatformRecordKind;
///
/// let token = PermissionToken::read(PlatformRecordKind::Weight);
/// assert_eq!(token.to_string(), "android.permission.health.READ_WEIGHT");
/// assert_eq!(PermissionToken::parse(&token.to_string()), Some(token));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionToken {
    pub access: AccessKind,
    pub kind: PlatformRecordKind,
}

impl PermissionToken {
    pub fn new(access: AccessKind, kind: PlatformRecordKind) -> Self {
        Self { access, kind }
    }

    pub fn read(kind: PlatformRecordKind) -> Self {
        Self::new(AccessKind::Read, kind)
    }

    pub fn write(kind: PlatformRecordKind) -> Self {
        Self::new(AccessKind::Write, kind)
    }

    /// Parse a full platform permission string.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix(PERMISSION_PREFIX)?;
        let (access, suffix) = if let Some(suffix) = rest.strip_prefix("READ_") {
            (AccessKind::Read, suffix)
        } else if let Some(suffix) = rest.strip_prefix("WRITE_") {
            (AccessKind::Write, suffix)
        } else {
            return None;
        };
        PlatformRecordKind::from_permission_suffix(suffix).map(|kind| Self::new(access, kind))
    }
}

impl fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}_{}",
            PERMISSION_PREFIX,
            self.access.as_str(),
            self.kind.permission_suffix()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(
            PermissionToken::write(PlatformRecordKind::HeartRateSeries).to_string(),
            "android.permission.health.WRITE_HEART_RATE"
        );
    }

    #[test]
    fn test_token_parse_rejects_foreign_strings() {
        assert_eq!(PermissionToken::parse("android.permission.CAMERA"), None);
        assert_eq!(
            PermissionToken::parse("android.permission.health.DELETE_WEIGHT"),
            None
        );
        assert_eq!(
            PermissionToken::parse("android.permission.health.READ_SLEEP"),
            None
        );
    }

    #[test]
    fn test_tokens_order_by_access_then_kind() {
        let read_steps = PermissionToken::read(PlatformRecordKind::Steps);
        let write_weight = PermissionToken::write(PlatformRecordKind::Weight);
        assert!(read_steps < write_weight);
    }
}
