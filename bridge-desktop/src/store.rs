//! Health Store using SQLite
//!
//! Records are kept as JSON payloads next to indexed kind and time columns.
//! Permission grants live in their own table; since a desktop host has no
//! system prompt, a [`PermissionPolicy`] decides how requests are answered.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    health::HealthStore,
    permissions::PermissionToken,
    records::{InsertResult, PlatformRecord, PlatformRecordKind, TimeRange},
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS health_records (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        start_ms INTEGER NOT NULL,
        end_ms INTEGER NOT NULL,
        payload TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_health_records_kind_time ON health_records (kind, start_ms)",
    r#"
    CREATE TABLE IF NOT EXISTS health_permissions (
        token TEXT PRIMARY KEY,
        granted_at INTEGER NOT NULL
    )
    "#,
];

/// How permission requests are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    /// Every request is granted and remembered
    #[default]
    GrantAll,
    /// Requests grant nothing; use [`SqliteHealthStore::grant`]
    Manual,
}

/// SQLite-backed platform health store for desktop hosts and tests.
///
/// The pool is opened on first use when the store is built with
/// [`lazy_in_memory`](Self::lazy_in_memory), so it always lives on the
/// runtime of the caller that drives it.
pub struct SqliteHealthStore {
    pool: OnceCell<SqlitePool>,
    policy: PermissionPolicy,
}

impl SqliteHealthStore {
    /// Open (or create) a store at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path_str))
            .map_err(db_error("Invalid database path"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to DB"))?;
        create_schema(&pool).await?;

        debug!(path = ?db_path.file_name(), "Initialized health store");
        Ok(Self::from_pool(pool))
    }

    /// Create a store backed by a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = open_in_memory().await?;
        Ok(Self::from_pool(pool))
    }

    /// In-memory store whose database is opened by the first call that
    /// touches it. Needs no runtime to construct.
    pub fn lazy_in_memory() -> Self {
        Self {
            pool: OnceCell::new(),
            policy: PermissionPolicy::default(),
        }
    }

    /// Default on-disk location in the user's data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("health-connect-bridge").join("health.db"))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: OnceCell::new_with(Some(pool)),
            policy: PermissionPolicy::default(),
        }
    }

    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool.get_or_try_init(open_in_memory).await
    }

    pub fn with_policy(mut self, policy: PermissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PermissionPolicy {
        self.policy
    }

    /// Record `tokens` as granted.
    pub async fn grant(&self, tokens: &BTreeSet<PermissionToken>) -> Result<()> {
        let mut tx = self
            .pool()
            .await?
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let now = chrono::Utc::now().timestamp_millis();
        for token in tokens {
            sqlx::query(
                r#"
                INSERT INTO health_permissions (token, granted_at)
                VALUES (?, ?)
                ON CONFLICT(token) DO NOTHING
                "#,
            )
            .bind(token.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to grant permission"))?;
        }

        tx.commit().await.map_err(db_error("Failed to commit"))?;
        debug!(count = tokens.len(), "Granted permissions");
        Ok(())
    }

    /// Drop `tokens` from the granted set.
    pub async fn revoke(&self, tokens: &BTreeSet<PermissionToken>) -> Result<()> {
        let pool = self.pool().await?;
        for token in tokens {
            sqlx::query("DELETE FROM health_permissions WHERE token = ?")
                .bind(token.to_string())
                .execute(pool)
                .await
                .map_err(db_error("Failed to revoke permission"))?;
        }

        debug!(count = tokens.len(), "Revoked permissions");
        Ok(())
    }

    /// Number of stored records of `kind`.
    pub async fn count(&self, kind: PlatformRecordKind) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM health_records WHERE kind = ?")
            .bind(kind_key(kind))
            .fetch_one(self.pool().await?)
            .await
            .map_err(db_error("Failed to count records"))?;

        Ok(row.get(0))
    }

    async fn all_granted(&self) -> Result<BTreeSet<PermissionToken>> {
        let rows = sqlx::query("SELECT token FROM health_permissions")
            .fetch_all(self.pool().await?)
            .await
            .map_err(db_error("Failed to read permissions"))?;

        let mut granted = BTreeSet::new();
        for row in rows {
            let raw: String = row.get(0);
            match PermissionToken::parse(&raw) {
                Some(token) => {
                    granted.insert(token);
                }
                None => warn!(token = %raw, "Ignoring unrecognized stored permission"),
            }
        }
        Ok(granted)
    }
}

#[async_trait]
impl HealthStore for SqliteHealthStore {
    async fn query(
        &self,
        kind: PlatformRecordKind,
        range: TimeRange,
    ) -> Result<Vec<PlatformRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM health_records
            WHERE kind = ? AND start_ms <= ? AND end_ms >= ?
            ORDER BY start_ms, id
            "#,
        )
        .bind(kind_key(kind))
        .bind(range.end.timestamp_millis())
        .bind(range.start.timestamp_millis())
        .fetch_all(self.pool().await?)
        .await
        .map_err(db_error("Failed to query records"))?;

        let records = rows
            .into_iter()
            .map(|row| {
                let payload: String = row.get(0);
                serde_json::from_str::<PlatformRecord>(&payload).map_err(|e| {
                    BridgeError::InvalidRecord(format!("Corrupt stored record: {}", e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(kind = %kind, count = records.len(), "Queried records");
        Ok(records)
    }

    async fn insert(&self, records: Vec<PlatformRecord>) -> Result<InsertResult> {
        let mut tx = self
            .pool()
            .await?
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let mut record_ids = Vec::with_capacity(records.len());
        for record in &records {
            let id = record.metadata().id.to_string();
            let payload = serde_json::to_string(record)
                .map_err(|e| BridgeError::InvalidRecord(format!("Unserializable record: {}", e)))?;

            sqlx::query(
                r#"
                INSERT INTO health_records (id, kind, start_ms, end_ms, payload)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    kind = excluded.kind,
                    start_ms = excluded.start_ms,
                    end_ms = excluded.end_ms,
                    payload = excluded.payload
                "#,
            )
            .bind(&id)
            .bind(kind_key(record.kind()))
            .bind(record.start_time().timestamp_millis())
            .bind(record.end_time().timestamp_millis())
            .bind(payload)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert record"))?;

            record_ids.push(id);
        }

        tx.commit().await.map_err(db_error("Failed to commit"))?;
        debug!(count = record_ids.len(), "Inserted records");
        Ok(InsertResult { record_ids })
    }

    async fn granted_permissions(
        &self,
        requested: &BTreeSet<PermissionToken>,
    ) -> Result<BTreeSet<PermissionToken>> {
        let granted = self.all_granted().await?;
        Ok(requested.intersection(&granted).copied().collect())
    }

    async fn request_permissions(
        &self,
        requested: &BTreeSet<PermissionToken>,
    ) -> Result<BTreeSet<PermissionToken>> {
        match self.policy {
            PermissionPolicy::GrantAll => {
                info!(count = requested.len(), "Auto-granting requested permissions");
                self.grant(requested).await?;
            }
            PermissionPolicy::Manual => {
                debug!(count = requested.len(), "Permission request left to manual grants");
            }
        }
        self.granted_permissions(requested).await
    }
}

async fn open_in_memory() -> Result<SqlitePool> {
    // A single connection that never expires keeps the database alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(db_error("Failed to connect to DB"))?;

    create_schema(&pool).await?;
    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(db_error("Failed to create schema"))?;
    }
    Ok(())
}

fn kind_key(kind: PlatformRecordKind) -> &'static str {
    kind.permission_suffix()
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> BridgeError {
    move |e| BridgeError::DatabaseError(format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::records::{HeartRateSample, RecordMetadata};
    use chrono::{Duration, TimeZone, Utc};

    fn at(hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, hour, 0, 0).unwrap()
    }

    fn steps(start: u32, end: u32, count: i64) -> PlatformRecord {
        PlatformRecord::Steps {
            metadata: RecordMetadata::new(),
            start_time: at(start),
            end_time: at(end),
            count,
        }
    }

    #[tokio::test]
    async fn test_insert_returns_ids() {
        let store = SqliteHealthStore::in_memory().await.unwrap();
        let result = store
            .insert(vec![steps(8, 9, 100), steps(9, 10, 200)])
            .await
            .unwrap();

        assert_eq!(result.record_ids.len(), 2);
        assert_eq!(store.count(PlatformRecordKind::Steps).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_query_filters_by_kind_and_overlap() {
        let store = SqliteHealthStore::in_memory().await.unwrap();
        let weight = PlatformRecord::Weight {
            metadata: RecordMetadata::new(),
            time: at(9),
            weight_kg: 70.0,
        };
        store
            .insert(vec![steps(6, 7, 50), steps(9, 11, 300), weight])
            .await
            .unwrap();

        let found = store
            .query(
                PlatformRecordKind::Steps,
                TimeRange::between(at(10), at(12)),
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], PlatformRecord::Steps { count: 300, .. }));
    }

    #[tokio::test]
    async fn test_records_round_trip_through_json() {
        let store = SqliteHealthStore::in_memory().await.unwrap();
        let series = PlatformRecord::HeartRateSeries {
            metadata: RecordMetadata::new().with_origin("desktop"),
            start_time: at(7),
            end_time: at(7) + Duration::minutes(5),
            samples: vec![HeartRateSample {
                time: at(7),
                beats_per_minute: 61,
            }],
        };
        store.insert(vec![series.clone()]).await.unwrap();

        let found = store
            .query(
                PlatformRecordKind::HeartRateSeries,
                TimeRange::between(at(0), at(23)),
            )
            .await
            .unwrap();
        assert_eq!(found, vec![series]);
    }

    #[tokio::test]
    async fn test_grant_all_policy() {
        let store = SqliteHealthStore::in_memory().await.unwrap();
        let requested: BTreeSet<_> = [PermissionToken::read(PlatformRecordKind::Weight)]
            .into_iter()
            .collect();

        assert!(store
            .granted_permissions(&requested)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store.request_permissions(&requested).await.unwrap(),
            requested
        );
        assert_eq!(store.granted_permissions(&requested).await.unwrap(), requested);
    }

    #[tokio::test]
    async fn test_manual_policy_grants_nothing_until_granted() {
        let store = SqliteHealthStore::in_memory()
            .await
            .unwrap()
            .with_policy(PermissionPolicy::Manual);
        let requested: BTreeSet<_> = [
            PermissionToken::read(PlatformRecordKind::Steps),
            PermissionToken::write(PlatformRecordKind::Steps),
        ]
        .into_iter()
        .collect();

        assert!(store
            .request_permissions(&requested)
            .await
            .unwrap()
            .is_empty());

        store.grant(&requested).await.unwrap();
        assert_eq!(store.granted_permissions(&requested).await.unwrap(), requested);

        store.revoke(&requested).await.unwrap();
        assert!(store
            .granted_permissions(&requested)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lazy_store_opens_on_first_use() {
        // Built with no runtime around, then driven by one created later
        let store = SqliteHealthStore::lazy_in_memory();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            store.insert(vec![steps(8, 9, 100)]).await.unwrap();
            store.insert(vec![steps(9, 10, 50)]).await.unwrap();

            let found = store
                .query(PlatformRecordKind::Steps, TimeRange::between(at(0), at(23)))
                .await
                .unwrap();
            assert_eq!(found.len(), 2);
            assert_eq!(store.count(PlatformRecordKind::Steps).await.unwrap(), 2);
        });
    }

    #[tokio::test]
    async fn test_lazy_store_inside_runtime_keeps_grants() {
        let store = SqliteHealthStore::lazy_in_memory();
        let requested: BTreeSet<_> = [PermissionToken::write(PlatformRecordKind::Weight)]
            .into_iter()
            .collect();

        assert_eq!(
            store.request_permissions(&requested).await.unwrap(),
            requested
        );
        assert_eq!(store.granted_permissions(&requested).await.unwrap(), requested);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = std::env::temp_dir().join(format!("health-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("health.db");

        {
            let store = SqliteHealthStore::new(path.clone()).await.unwrap();
            store.insert(vec![steps(8, 9, 42)]).await.unwrap();
        }
        assert!(path.is_file());

        let reopened = SqliteHealthStore::new(path).await.unwrap();
        assert_eq!(reopened.count(PlatformRecordKind::Steps).await.unwrap(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }
}
