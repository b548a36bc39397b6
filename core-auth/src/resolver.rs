//! Permission Resolver
//!
//! Pure mapping from (operations × record types) to platform permission
//! tokens. The result is a set, so input order and duplicates never change it.

use std::collections::BTreeSet;

use bridge_traits::permissions::PermissionToken;
use core_records::{platform_kind_of, RecordType};

use crate::error::Result;
use crate::types::OperationType;

/// Resolve the tokens needed for every operation over every record type.
///
/// Either list being empty yields an empty set.
///
/// # Examples
///
/// ```
/// use core_auth::{resolve_permissions, OperationType};
/// use core_records::RecordType;
///
/// let tokens = resolve_permissions(
///     &[OperationType::Read, OperationType::Write],
///     &[RecordType::Weight, RecordType::Steps],
/// );
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn resolve_permissions(
    operations: &[OperationType],
    record_types: &[RecordType],
) -> BTreeSet<PermissionToken> {
    operations
        .iter()
        .flat_map(|operation| operation.accesses().iter())
        .flat_map(|access| {
            record_types
                .iter()
                .map(move |record_type| {
                    PermissionToken::new(*access, platform_kind_of(*record_type))
                })
        })
        .collect()
}

/// Resolve tokens from protocol ordinals.
///
/// Every ordinal is decoded before resolution, so an unknown record type
/// fails even when the operation list is empty.
pub fn resolve_raw(operations: &[i64], record_types: &[i64]) -> Result<BTreeSet<PermissionToken>> {
    let operations = operations
        .iter()
        .map(|ordinal| OperationType::from_ordinal(*ordinal))
        .collect::<Result<Vec<_>>>()?;
    let record_types = record_types
        .iter()
        .map(|ordinal| RecordType::from_ordinal(*ordinal))
        .collect::<core_records::Result<Vec<_>>>()?;

    Ok(resolve_permissions(&operations, &record_types))
}
