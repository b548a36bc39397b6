//! Platform Health Store Abstraction
//!
//! The record store and permission controller the host platform owns.

use std::collections::BTreeSet;

use crate::{
    error::Result,
    permissions::PermissionToken,
    records::{InsertResult, PlatformRecord, PlatformRecordKind, TimeRange},
};

/// Health data store trait
///
/// Wraps the platform's health data service (Health Connect on Android).
/// All calls may block on IPC with the provider app, so they are async.
///
/// # Permission flow
///
/// The core asks [`granted_permissions`](HealthStore::granted_permissions)
/// first and only calls
/// [`request_permissions`](HealthStore::request_permissions) when something
/// is missing, since the latter shows UI on device.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::health::HealthStore;
/// use bridge_traits::records::{PlatformRecordKind, TimeRange};
///
/// async fn count_weights(store: &dyn HealthStore, range: TimeRange) -> usize {
///     store
///         .query(PlatformRecordKind::Weight, range)
///         .await
///         .map(|records| records.len())
///         .unwrap_or(0)
/// }
/// ```
#[async_trait::async_trait]
pub trait HealthStore: Send + Sync {
    /// Read every record of `kind` that overlaps `range`, oldest first.
    async fn query(&self, kind: PlatformRecordKind, range: TimeRange)
        -> Result<Vec<PlatformRecord>>;

    /// Persist records atomically and return their assigned identifiers.
    async fn insert(&self, records: Vec<PlatformRecord>) -> Result<InsertResult>;

    /// Subset of `requested` the user has already granted.
    async fn granted_permissions(
        &self,
        requested: &BTreeSet<PermissionToken>,
    ) -> Result<BTreeSet<PermissionToken>>;

    /// Ask the user for `requested` and return what ended up granted.
    async fn request_permissions(
        &self,
        requested: &BTreeSet<PermissionToken>,
    ) -> Result<BTreeSet<PermissionToken>>;
}
