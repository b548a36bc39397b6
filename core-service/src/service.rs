//! # Health Connect Service
//!
//! The dispatcher behind the method channel. Each call is decoded into a
//! typed request, checked against availability and grants, and only then
//! handed to the platform store.
//!
//! ## Usage
//!
//! ```no_run
//! # #[cfg(feature = "desktop-shims")]
//! # async fn run() -> core_service::Result<()> {
//! use core_service::HealthConnectService;
//! use serde_json::json;
//!
//! let service = HealthConnectService::desktop()?;
//! let response = service
//!     .handle("readRecords", &json!({ "recordType": 9 }))
//!     .await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use bridge_traits::{HealthStore, PlatformInfo};
use core_auth::{resolve_permissions, AuthorizationManager, OperationType};
use core_records::{
    platform_kind_of, to_platform_record, to_record_entries, RecordEntry, RecordType,
};
use core_runtime::CoreConfig;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::availability::{check_availability, ensure_available, Availability};
use crate::error::{CoreError, Result};
use crate::protocol::{
    Method, PermissionsRequest, ReadRequest, TimeContext, TotalsRequest, WriteRequest,
};
use crate::response::MethodResponse;

/// Primary façade exposed to host applications.
///
/// Holds only shared handles; clones are cheap and calls may run
/// concurrently.
#[derive(Clone)]
pub struct HealthConnectService {
    config: Arc<CoreConfig>,
    auth: AuthorizationManager,
}

impl HealthConnectService {
    /// Create a service from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let auth = AuthorizationManager::new(Arc::clone(&config.health_store));
        info!(
            min_supported_sdk = config.min_supported_sdk,
            max_records_per_read = config.max_records_per_read,
            "Health Connect service ready"
        );
        Ok(Self {
            config: Arc::new(config),
            auth,
        })
    }

    /// Service over the desktop shims: in-memory store, static platform.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop() -> Result<Self> {
        Self::new(CoreConfig::builder().build()?)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn store(&self) -> &dyn HealthStore {
        self.config.health_store.as_ref()
    }

    fn platform(&self) -> &dyn PlatformInfo {
        self.config.platform_info.as_ref()
    }

    fn time_context(&self) -> TimeContext {
        TimeContext::new(self.config.clock.as_ref(), self.config.local_offset())
    }

    /// Answer one method channel call.
    ///
    /// Unknown methods answer [`MethodResponse::NotImplemented`]; every
    /// failure is mapped to its error code.
    #[instrument(skip(self, args), fields(method = %method))]
    pub async fn handle(&self, method: &str, args: &Value) -> MethodResponse {
        let Some(parsed) = Method::parse(method) else {
            debug!("Unknown method");
            return MethodResponse::NotImplemented;
        };

        match self.dispatch(parsed, args).await {
            Ok(payload) => MethodResponse::success(payload),
            Err(err) => {
                warn!(code = err.code(), error = %err, "Method failed");
                MethodResponse::from_error(&err)
            }
        }
    }

    async fn dispatch(&self, method: Method, args: &Value) -> Result<Value> {
        let payload = match method {
            Method::GetPlatformVersionName => Value::from(self.platform_version_name()),
            Method::GetPlatformVersionCode => Value::from(self.platform_version_code()),
            Method::CheckAvailability => Value::from(self.check_health_connect_availability()?),
            Method::RequestPermissions => {
                let request = PermissionsRequest::decode(args)?;
                Value::from(self.request_permissions(&request).await?)
            }
            Method::HasPermissions => {
                let request = PermissionsRequest::decode(args)?;
                Value::from(self.has_permissions(&request).await?)
            }
            Method::ReadRecords => {
                let request = ReadRequest::decode(args, &self.time_context())?;
                let entries = self.read_records(&request).await?;
                serde_json::to_value(entries)?
            }
            Method::WriteRecords => {
                let request = WriteRequest::decode(args, &self.time_context())?;
                Value::from(self.write_records(&request).await?)
            }
            Method::GetTotalSteps => {
                let request = TotalsRequest::decode(args, &self.time_context())?;
                Value::from(self.total_steps(&request).await?)
            }
            Method::GetTotalActivitySession => {
                let request = TotalsRequest::decode(args, &self.time_context())?;
                Value::from(self.total_activity_session(&request).await?)
            }
        };
        Ok(payload)
    }

    pub fn platform_version_name(&self) -> String {
        self.platform().version_name()
    }

    pub fn platform_version_code(&self) -> i64 {
        self.platform().version_code()
    }

    /// Current availability, asked fresh from the platform.
    pub fn availability(&self) -> Availability {
        check_availability(self.platform(), self.config.min_supported_sdk)
    }

    /// `true` when installed, otherwise the matching availability error.
    pub fn check_health_connect_availability(&self) -> Result<bool> {
        self.ensure_available()?;
        Ok(true)
    }

    fn ensure_available(&self) -> Result<()> {
        ensure_available(self.platform(), self.config.min_supported_sdk)
    }

    /// Request grants for every (operation, record type) pair, prompting
    /// only for what is missing.
    #[instrument(skip(self, request))]
    pub async fn request_permissions(&self, request: &PermissionsRequest) -> Result<bool> {
        self.ensure_available()?;
        Ok(self
            .auth
            .request_authorization(&request.operations, &request.record_types)
            .await?)
    }

    pub async fn has_permissions(&self, request: &PermissionsRequest) -> Result<bool> {
        self.ensure_available()?;
        Ok(self
            .auth
            .has_permissions_for(&request.operations, &request.record_types)
            .await?)
    }

    /// Read entries of one record type, oldest first, capped at
    /// `max_records_per_read`.
    #[instrument(skip(self, request), fields(record_type = %request.record_type))]
    pub async fn read_records(&self, request: &ReadRequest) -> Result<Vec<RecordEntry>> {
        self.ensure_available()?;
        self.require(OperationType::Read, request.record_type).await?;

        let records = self
            .store()
            .query(platform_kind_of(request.record_type), request.range)
            .await?;
        let mut entries = to_record_entries(request.record_type, &records)?;

        let limit = self.config.max_records_per_read;
        if entries.len() > limit {
            warn!(
                found = entries.len(),
                limit, "Read returned more records than allowed, truncating"
            );
            entries.truncate(limit);
        }
        debug!(count = entries.len(), "Read records");
        Ok(entries)
    }

    /// Validate and insert one record. `true` when the store assigned at
    /// least one id.
    #[instrument(skip(self, request), fields(record_type = %request.record_type))]
    pub async fn write_records(&self, request: &WriteRequest) -> Result<bool> {
        self.ensure_available()?;
        let record = to_platform_record(
            request.record_type,
            &request.value,
            request.start,
            request.end,
        )?;
        self.require(OperationType::Write, request.record_type).await?;

        let result = self.store().insert(vec![record]).await?;
        debug!(inserted = result.record_ids.len(), "Wrote records");
        Ok(!result.is_empty())
    }

    /// Sum of step counts in the window.
    pub async fn total_steps(&self, request: &TotalsRequest) -> Result<i64> {
        let entries = self.read_all(RecordType::Steps, request).await?;
        checked_total(
            RecordType::Steps,
            entries.iter().filter_map(|entry| entry.value.as_i64()),
        )
    }

    /// Total minutes of activity sessions in the window.
    pub async fn total_activity_session(&self, request: &TotalsRequest) -> Result<i64> {
        let entries = self.read_all(RecordType::ActivitySession, request).await?;
        checked_total(
            RecordType::ActivitySession,
            entries.iter().map(|entry| entry.duration().num_minutes()),
        )
    }

    // Totals aggregate the whole window, so they skip the read cap
    async fn read_all(
        &self,
        record_type: RecordType,
        request: &TotalsRequest,
    ) -> Result<Vec<RecordEntry>> {
        self.ensure_available()?;
        self.require(OperationType::Read, record_type).await?;

        let records = self
            .store()
            .query(platform_kind_of(record_type), request.range)
            .await?;
        Ok(to_record_entries(record_type, &records)?)
    }

    async fn require(&self, operation: OperationType, record_type: RecordType) -> Result<()> {
        let tokens = resolve_permissions(&[operation], &[record_type]);
        let missing = self.auth.missing_permissions(&tokens).await?;
        if missing.is_empty() {
            return Ok(());
        }
        Err(CoreError::PermissionDenied {
            missing: missing.iter().map(ToString::to_string).collect(),
        })
    }
}

fn checked_total(record_type: RecordType, mut values: impl Iterator<Item = i64>) -> Result<i64> {
    values
        .try_fold(0i64, |total, value| total.checked_add(value))
        .ok_or(CoreError::TotalOverflow { record_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::permissions::PermissionToken;
    use bridge_traits::records::{
        InsertResult, PlatformRecord, PlatformRecordKind, RecordMetadata, TimeRange,
    };
    use bridge_traits::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockall::mock;
    use serde_json::json;
    use std::collections::BTreeSet;

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

    struct Device {
        sdk: i64,
        installed: bool,
    }

    impl PlatformInfo for Device {
        fn version_name(&self) -> String {
            "14".to_string()
        }

        fn version_code(&self) -> i64 {
            self.sdk
        }

        fn is_provider_installed(&self) -> bool {
            self.installed
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn service_with(store: MockStore, device: Device, max_records: usize) -> HealthConnectService {
        let config = CoreConfig::builder()
            .health_store(Arc::new(store))
            .platform_info(Arc::new(device))
            .clock(Arc::new(FixedClock::new(at(12))))
            .max_records_per_read(max_records)
            .build()
            .unwrap();
        HealthConnectService::new(config).unwrap()
    }

    fn service(store: MockStore) -> HealthConnectService {
        service_with(
            store,
            Device {
                sdk: 34,
                installed: true,
            },
            100,
        )
    }

    fn grant_everything(store: &mut MockStore) {
        store
            .expect_granted_permissions()
            .returning(|requested| Ok(requested.clone()));
    }

    fn weight(hour: u32, kg: f64) -> PlatformRecord {
        PlatformRecord::Weight {
            metadata: RecordMetadata::new(),
            time: at(hour),
            weight_kg: kg,
        }
    }

    #[tokio::test]
    async fn test_read_without_permission_never_queries() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .times(1)
            .returning(|_| Ok(BTreeSet::new()));
        store.expect_query().times(0);

        let response = service(store)
            .handle("readRecords", &json!({ "recordType": 0 }))
            .await;

        assert_eq!(response.error_code(), Some("401"));
        match response {
            MethodResponse::Error { details, .. } => assert_eq!(
                details.as_deref(),
                Some("request permissions needed: android.permission.health.READ_WEIGHT")
            ),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_write_never_touches_store() {
        let mut store = MockStore::new();
        store.expect_granted_permissions().times(0);
        store.expect_insert().times(0);

        let response = service(store)
            .handle(
                "writeRecords",
                &json!({ "recordType": 0, "value": "not-a-number" }),
            )
            .await;

        assert_eq!(response.error_code(), Some("400"));
    }

    #[tokio::test]
    async fn test_write_without_permission_never_inserts() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .returning(|_| Ok(BTreeSet::new()));
        store.expect_insert().times(0);

        let response = service(store)
            .handle(
                "writeRecords",
                &json!({
                    "recordType": 9,
                    "value": 500,
                    "startTime": at(8).timestamp_millis(),
                    "endTime": at(9).timestamp_millis(),
                }),
            )
            .await;

        assert_eq!(response.error_code(), Some("401"));
    }

    #[tokio::test]
    async fn test_write_inserts_validated_record() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store
            .expect_insert()
            .times(1)
            .withf(|records| {
                matches!(
                    records.as_slice(),
                    [PlatformRecord::Weight { weight_kg, .. }]
                        if (*weight_kg - 72.5).abs() < f64::EPSILON
                )
            })
            .returning(|records| {
                Ok(InsertResult {
                    record_ids: records
                        .iter()
                        .map(|record| record.metadata().id.to_string())
                        .collect(),
                })
            });

        let response = service(store)
            .handle("writeRecords", &json!({ "recordType": 0, "value": 72.5 }))
            .await;

        assert_eq!(response, MethodResponse::Success(json!(true)));
    }

    #[tokio::test]
    async fn test_write_reports_false_when_no_ids_returned() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store
            .expect_insert()
            .returning(|_| Ok(InsertResult::default()));

        let granted = service(store)
            .write_records(&WriteRequest {
                record_type: RecordType::Height,
                value: "1.8".to_string(),
                start: at(8),
                end: None,
            })
            .await
            .unwrap();

        assert!(!granted);
    }

    #[tokio::test]
    async fn test_read_marshals_and_caps_results() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store
            .expect_query()
            .withf(|kind, range| {
                *kind == PlatformRecordKind::Weight && *range == TimeRange::between(at(0), at(12))
            })
            .returning(|_, _| Ok(vec![weight(7, 72.0), weight(8, 72.5), weight(9, 73.0)]));

        let service = service_with(
            store,
            Device {
                sdk: 34,
                installed: true,
            },
            2,
        );
        let entries = service
            .read_records(&ReadRequest {
                record_type: RecordType::Weight,
                range: TimeRange::between(at(0), at(12)),
            })
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].start_time, at(7));
        assert_eq!(entries[1].value.as_f64(), Some(72.5));
    }

    #[tokio::test]
    async fn test_read_of_mismatched_record_is_internal_error() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store.expect_query().returning(|_, _| {
            Ok(vec![PlatformRecord::Height {
                metadata: RecordMetadata::new(),
                time: at(8),
                height_m: 1.8,
            }])
        });

        let response = service(store)
            .handle("readRecords", &json!({ "recordType": 0 }))
            .await;

        assert_eq!(response.error_code(), Some("500"));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store
            .expect_query()
            .returning(|_, _| Err(BridgeError::OperationFailed("provider crashed".into())));

        let response = service(store)
            .handle("getTotalSteps", &Value::Null)
            .await;

        assert_eq!(response.error_code(), Some("500"));
    }

    #[tokio::test]
    async fn test_totals() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store
            .expect_query()
            .withf(|kind, _| *kind == PlatformRecordKind::Steps)
            .returning(|_, _| {
                Ok(vec![
                    PlatformRecord::Steps {
                        metadata: RecordMetadata::new(),
                        start_time: at(8),
                        end_time: at(9),
                        count: 1200,
                    },
                    PlatformRecord::Steps {
                        metadata: RecordMetadata::new(),
                        start_time: at(10),
                        end_time: at(11),
                        count: 800,
                    },
                ])
            });
        store
            .expect_query()
            .withf(|kind, _| *kind == PlatformRecordKind::ActivitySession)
            .returning(|_, _| {
                Ok(vec![PlatformRecord::ActivitySession {
                    metadata: RecordMetadata::new(),
                    start_time: at(6),
                    end_time: at(6) + Duration::minutes(45),
                    activity_type: "RUNNING".to_string(),
                    title: None,
                }])
            });

        let service = service(store);
        assert_eq!(
            service.handle("getTotalSteps", &json!({})).await,
            MethodResponse::Success(json!(2000))
        );
        assert_eq!(
            service.handle("getTotalActivitySession", &json!({})).await,
            MethodResponse::Success(json!(45))
        );
    }

    #[tokio::test]
    async fn test_total_steps_overflow_is_internal_error() {
        let mut store = MockStore::new();
        grant_everything(&mut store);
        store.expect_query().returning(|_, _| {
            Ok([i64::MAX, 1]
                .into_iter()
                .map(|count| PlatformRecord::Steps {
                    metadata: RecordMetadata::new(),
                    start_time: at(8),
                    end_time: at(9),
                    count,
                })
                .collect())
        });

        let response = service(store).handle("getTotalSteps", &json!({})).await;
        assert_eq!(response.error_code(), Some("500"));
    }

    #[tokio::test]
    async fn test_request_permissions_prompts_for_missing_only() {
        let mut store = MockStore::new();
        store
            .expect_granted_permissions()
            .returning(|_| Ok(BTreeSet::from([PermissionToken::read(PlatformRecordKind::Steps)])));
        store
            .expect_request_permissions()
            .times(1)
            .withf(|requested| {
                *requested == BTreeSet::from([PermissionToken::write(PlatformRecordKind::Steps)])
            })
            .returning(|requested| Ok(requested.clone()));

        let response = service(store)
            .handle(
                "requestAuthorization",
                &json!({ "permissionTypes": [2], "recordTypes": [9] }),
            )
            .await;

        assert_eq!(response, MethodResponse::Success(json!(true)));
    }

    #[tokio::test]
    async fn test_missing_provider_stops_before_store() {
        let mut store = MockStore::new();
        store.expect_granted_permissions().times(0);
        store.expect_query().times(0);

        let service = service_with(
            store,
            Device {
                sdk: 30,
                installed: false,
            },
            100,
        );

        let response = service
            .handle("readRecords", &json!({ "recordType": 9 }))
            .await;
        assert_eq!(response.error_code(), Some("NOT_INSTALLED"));

        let response = service.handle("checkHealthConnectAvailability", &Value::Null).await;
        assert_eq!(response.error_code(), Some("NOT_INSTALLED"));
        assert_eq!(service.availability(), Availability::NotInstalled);
    }

    #[tokio::test]
    async fn test_platform_version_methods() {
        let service = service(MockStore::new());

        assert_eq!(
            service.handle("getPlatformVersionName", &Value::Null).await,
            MethodResponse::Success(json!("14"))
        );
        assert_eq!(
            service.handle("getPlatformVersionCode", &Value::Null).await,
            MethodResponse::Success(json!(34))
        );
        assert_eq!(
            service.handle("checkHealthConnectAvailability", &Value::Null).await,
            MethodResponse::Success(json!(true))
        );
    }

    #[tokio::test]
    async fn test_unknown_method_is_not_implemented() {
        let service = service(MockStore::new());
        assert_eq!(
            service.handle("deleteRecords", &json!({})).await,
            MethodResponse::NotImplemented
        );
    }
}
