//! # Authorization Manager
//!
//! Checks and requests platform grants through the host's permission
//! controller.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthorizationManager, OperationType};
//! use core_records::RecordType;
//! # use bridge_traits::HealthStore;
//! # use std::sync::Arc;
//!
//! # async fn run(store: Arc<dyn HealthStore>) -> core_auth::Result<()> {
//! let manager = AuthorizationManager::new(store);
//!
//! let granted = manager
//!     .request_authorization(&[OperationType::Read], &[RecordType::Steps])
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use bridge_traits::{permissions::PermissionToken, HealthStore};
use core_records::RecordType;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::resolver::resolve_permissions;
use crate::types::OperationType;

/// Grants checker over the platform health store.
///
/// Holds no state beyond the store handle; every call asks the platform.
#[derive(Clone)]
pub struct AuthorizationManager {
    store: Arc<dyn HealthStore>,
}

impl AuthorizationManager {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    /// Tokens from `tokens` the platform has not granted.
    #[instrument(skip(self, tokens), fields(requested = tokens.len()))]
    pub async fn missing_permissions(
        &self,
        tokens: &BTreeSet<PermissionToken>,
    ) -> Result<BTreeSet<PermissionToken>> {
        if tokens.is_empty() {
            return Ok(BTreeSet::new());
        }

        let granted = self.store.granted_permissions(tokens).await?;
        let missing: BTreeSet<_> = tokens.difference(&granted).copied().collect();
        debug!(missing = missing.len(), "Checked granted permissions");
        Ok(missing)
    }

    /// Whether every token in `tokens` is granted. An empty set is trivially
    /// granted.
    pub async fn has_all_permissions(&self, tokens: &BTreeSet<PermissionToken>) -> Result<bool> {
        Ok(self.missing_permissions(tokens).await?.is_empty())
    }

    /// Resolve and check the tokens for `operations` over `record_types`.
    pub async fn has_permissions_for(
        &self,
        operations: &[OperationType],
        record_types: &[RecordType],
    ) -> Result<bool> {
        let tokens = resolve_permissions(operations, record_types);
        self.has_all_permissions(&tokens).await
    }

    /// Make sure the tokens for `operations` over `record_types` are held,
    /// asking the host to prompt for them when they are not.
    ///
    /// Returns `true` only when every resolved token ends up granted.
    #[instrument(
        skip(self, operations, record_types),
        fields(operations = operations.len(), record_types = record_types.len())
    )]
    pub async fn request_authorization(
        &self,
        operations: &[OperationType],
        record_types: &[RecordType],
    ) -> Result<bool> {
        let tokens = resolve_permissions(operations, record_types);
        let missing = self.missing_permissions(&tokens).await?;
        if missing.is_empty() {
            debug!("All requested permissions already granted");
            return Ok(true);
        }

        info!(count = missing.len(), "Requesting health permissions from host");
        let granted = self.store.request_permissions(&missing).await?;
        let all_granted = missing.is_subset(&granted);
        if !all_granted {
            warn!(
                denied = missing.difference(&granted).count(),
                "Host did not grant every requested permission"
            );
        }
        Ok(all_granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::records::{InsertResult, PlatformRecord, PlatformRecordKind, TimeRange};
    use mockall::mock;

    mock! {
        Store {}

        #[async_trait::async_trait]
        impl HealthStore for Store {
            async fn query(&self, kind: PlatformRecordKind, range: TimeRange) -> BridgeResult<Vec<PlatformRecord>>;
            async fn insert(&self, records: Vec<PlatformRecord>) -> BridgeResult<InsertResult>;
            async fn granted_permissions(&self, requested: &BTreeSet<PermissionToken>) -> BridgeResult<BTreeSet<PermissionToken>>;
            async fn request_permissions(&self, requested: &BTreeSet<PermissionToken>) -> BridgeResult<BTreeSet<PermissionToken>>;
        }
    }

    fn weight_tokens() -> BTreeSet<PermissionToken> {
        resolve_permissions(&[OperationType::ReadWrite], &[RecordType::Weight])
    }

    #[tokio::test]
    async fn test_has_all_permissions_when_granted() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .times(1)
            .returning(|requested| Ok(requested.clone()));

        let manager = AuthorizationManager::new(Arc::new(store));
        assert!(manager.has_all_permissions(&weight_tokens()).await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_grant_is_not_all() {
        let mut store = MockStore::new();
        store.expect_granted_permissions().returning(|_| {
            Ok([PermissionToken::read(PlatformRecordKind::Weight)]
                .into_iter()
                .collect())
        });

        let manager = AuthorizationManager::new(Arc::new(store));
        let missing = manager.missing_permissions(&weight_tokens()).await.unwrap();
        assert_eq!(
            missing.into_iter().collect::<Vec<_>>(),
            vec![PermissionToken::write(PlatformRecordKind::Weight)]
        );
    }

    #[tokio::test]
    async fn test_empty_request_skips_store() {
        let mut store = MockStore::new();
        store.expect_granted_permissions().never();

        let manager = AuthorizationManager::new(Arc::new(store));
        assert!(manager.has_all_permissions(&BTreeSet::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_request_authorization_skips_prompt_when_granted() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .returning(|requested| Ok(requested.clone()));
        store.expect_request_permissions().never();

        let manager = AuthorizationManager::new(Arc::new(store));
        let granted = manager
            .request_authorization(&[OperationType::Read], &[RecordType::Steps])
            .await
            .unwrap();
        assert!(granted);
    }

    #[tokio::test]
    async fn test_request_authorization_prompts_for_missing_only() {
        let mut store = MockStore::new();
        store.expect_granted_permissions().returning(|_| {
            Ok([PermissionToken::read(PlatformRecordKind::Steps)]
                .into_iter()
                .collect())
        });
        store
            .expect_request_permissions()
            .times(1)
            .withf(|requested| {
                requested.len() == 1
                    && requested.contains(&PermissionToken::write(PlatformRecordKind::Steps))
            })
            .returning(|requested| Ok(requested.clone()));

        let manager = AuthorizationManager::new(Arc::new(store));
        let granted = manager
            .request_authorization(&[OperationType::ReadWrite], &[RecordType::Steps])
            .await
            .unwrap();
        assert!(granted);
    }

    #[tokio::test]
    async fn test_request_authorization_reports_denial() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .returning(|_| Ok(BTreeSet::new()));
        store
            .expect_request_permissions()
            .times(1)
            .returning(|_| Ok(BTreeSet::new()));

        let manager = AuthorizationManager::new(Arc::new(store));
        let granted = manager
            .request_authorization(&[OperationType::Write], &[RecordType::Height])
            .await
            .unwrap();
        assert!(!granted);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .returning(|_| Err(BridgeError::NotAvailable("health store".into())));

        let manager = AuthorizationManager::new(Arc::new(store));
        let result = manager
            .has_permissions_for(&[OperationType::Read], &[RecordType::Weight])
            .await;
        assert!(matches!(result, Err(AuthError::Bridge(_))));
    }
}
