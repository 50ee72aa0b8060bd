//! Embedded SQLite record store.
//!
//! The schema matches the `pawn.db` files written by earlier versions of the
//! shop software, so an existing database can be opened in place.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::models::{AggregateRow, NewPawnRecord, PawnRecord, RecordStatus};
use crate::storage::codec::{self, RawAggregateRow, RawRecordRow};
use crate::storage::error::{BackendKind, StoreError};
use crate::storage::traits::RecordStorage;

/// SQLite-backed implementation of [`RecordStorage`]
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // One writer is all the ledger ever needs
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                backend: BackendKind::Local,
                reason: format!("{}: {}", path.display(), e),
            })?;

        Self::setup_schema(&pool).await?;
        info!("Opened local pawn store at {}", path.display());
        Ok(Self { pool })
    }

    /// Initialize an isolated in-memory store for tests
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, StoreError> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // The database lives only as long as its connection, so never recycle it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::setup_schema(&pool).await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pawn_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                cccd TEXT,
                items TEXT,
                total_amount REAL,
                date_pawn TEXT,
                date_redeemed TEXT,
                status TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_pawn_records_date_pawn
            ON pawn_records(date_pawn);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn record_exists(&self, id: i64) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT id FROM pawn_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

/// Read `total_amount` whatever storage class SQLite kept it in
fn read_amount(row: &SqliteRow, id: i64) -> Result<f64, StoreError> {
    if let Ok(value) = row.try_get::<f64, _>("total_amount") {
        return Ok(value);
    }
    if let Ok(value) = row.try_get::<i64, _>("total_amount") {
        return Ok(value as f64);
    }
    let text: String = row.try_get("total_amount").map_err(|e| StoreError::Decode {
        id,
        field: "total_amount",
        reason: e.to_string(),
    })?;
    codec::parse_amount(id, &text)
}

fn read_text(row: &SqliteRow, id: i64, column: &'static str) -> Result<Option<String>, StoreError> {
    row.try_get::<Option<String>, _>(column)
        .map_err(|e| StoreError::Decode {
            id,
            field: column,
            reason: e.to_string(),
        })
}

fn read_record(row: &SqliteRow) -> Result<PawnRecord, StoreError> {
    let id: i64 = row.try_get("id")?;
    let raw = RawRecordRow {
        id,
        name: read_text(row, id, "name")?.unwrap_or_default(),
        cccd: read_text(row, id, "cccd")?.unwrap_or_default(),
        items: read_text(row, id, "items")?.unwrap_or_default(),
        total_amount: read_amount(row, id)?,
        date_pawn: read_text(row, id, "date_pawn")?.unwrap_or_default(),
        date_redeemed: read_text(row, id, "date_redeemed")?,
        status: read_text(row, id, "status")?.unwrap_or_default(),
    };
    codec::decode_record(raw)
}

fn read_aggregate(row: &SqliteRow) -> Result<AggregateRow, StoreError> {
    let id: i64 = row.try_get("id")?;
    let raw = RawAggregateRow {
        id,
        total_amount: read_amount(row, id)?,
        date_pawn: read_text(row, id, "date_pawn")?.unwrap_or_default(),
        date_redeemed: read_text(row, id, "date_redeemed")?,
        status: read_text(row, id, "status")?.unwrap_or_default(),
    };
    codec::decode_aggregate(raw)
}

#[async_trait]
impl RecordStorage for SqliteRecordStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn create_record(&self, record: &NewPawnRecord) -> Result<i64, StoreError> {
        let items = codec::encode_items(&record.items)?;
        let result = sqlx::query(
            r#"
            INSERT INTO pawn_records (name, cccd, items, total_amount, date_pawn, date_redeemed, status)
            VALUES (?, ?, ?, ?, ?, NULL, ?)
            "#,
        )
        .bind(&record.customer_name)
        .bind(&record.customer_id)
        .bind(items)
        .bind(record.total_amount)
        .bind(codec::format_date(record.date_pawned))
        .bind(RecordStatus::Unredeemed.as_stored())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted pawn record {} into local store", id);
        Ok(id)
    }

    async fn get_record(&self, id: i64) -> Result<PawnRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, cccd, items, total_amount, date_pawn, date_redeemed, status
            FROM pawn_records
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => read_record(&r),
            None => Err(StoreError::NotFound { id }),
        }
    }

    async fn update_status(
        &self,
        id: i64,
        status: RecordStatus,
        applied_on: NaiveDate,
    ) -> Result<NaiveDate, StoreError> {
        let date_redeemed = match status {
            RecordStatus::Redeemed => Some(codec::format_date(applied_on)),
            RecordStatus::Unredeemed => None,
        };

        let result = sqlx::query("UPDATE pawn_records SET status = ?, date_redeemed = ? WHERE id = ?")
            .bind(status.as_stored())
            .bind(date_redeemed)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 && !self.record_exists(id).await? {
            return Err(StoreError::NotFound { id });
        }
        debug!("Local store set record {} to {} on {}", id, status, applied_on);
        Ok(applied_on)
    }

    async fn list_all(&self) -> Result<Vec<PawnRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, cccd, items, total_amount, date_pawn, date_redeemed, status
            FROM pawn_records
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match read_record(row) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record: {}", e),
            }
        }
        Ok(records)
    }

    async fn query_by_min_date(&self, from: NaiveDate) -> Result<Vec<AggregateRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, total_amount, date_pawn, date_redeemed, status
            FROM pawn_records
            WHERE date_pawn >= ?
            ORDER BY id
            "#,
        )
        .bind(codec::format_date(from))
        .fetch_all(&self.pool)
        .await?;

        let mut projection = Vec::with_capacity(rows.len());
        for row in &rows {
            match read_aggregate(row) {
                Ok(r) => projection.push(r),
                Err(e) => warn!("Skipping unreadable record in aggregation: {}", e),
            }
        }
        Ok(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{PawnItem, Purity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_record(name: &str, pawned: NaiveDate, amount: f64) -> NewPawnRecord {
        NewPawnRecord {
            customer_name: name.to_string(),
            customer_id: format!("ID-{}", name),
            items: vec![PawnItem {
                quantity: 1,
                description: "Gold ring".to_string(),
                weight: 2.5,
                purity: Purity::High,
            }],
            total_amount: amount,
            date_pawned: pawned,
        }
    }

    async fn setup_test() -> SqliteRecordStore {
        SqliteRecordStore::init_test().await.expect("Failed to create test store")
    }

    #[tokio::test]
    async fn test_create_and_get_record() {
        let store = setup_test().await;
        let input = new_record("An", date(2024, 1, 5), 1_000_000.0);

        let id = store.create_record(&input).await.expect("Failed to create record");
        let record = store.get_record(id).await.expect("Failed to get record");

        assert_eq!(record.id, id);
        assert_eq!(record.customer_name, "An");
        assert_eq!(record.customer_id, "ID-An");
        assert_eq!(record.items, input.items);
        assert_eq!(record.total_amount, 1_000_000.0);
        assert_eq!(record.date_pawned, date(2024, 1, 5));
        assert_eq!(record.status, RecordStatus::Unredeemed);
        assert_eq!(record.date_redeemed, None);
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = setup_test().await;
        let first = store.create_record(&new_record("A", date(2024, 1, 1), 1.0)).await.unwrap();
        let second = store.create_record(&new_record("B", date(2024, 1, 1), 1.0)).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_update_status_stamps_and_clears_date() {
        let store = setup_test().await;
        let id = store.create_record(&new_record("C", date(2024, 1, 5), 500.0)).await.unwrap();

        let applied = store
            .update_status(id, RecordStatus::Redeemed, date(2024, 1, 20))
            .await
            .unwrap();
        assert_eq!(applied, date(2024, 1, 20));
        let redeemed = store.get_record(id).await.unwrap();
        assert_eq!(redeemed.status, RecordStatus::Redeemed);
        assert_eq!(redeemed.date_redeemed, Some(date(2024, 1, 20)));

        store
            .update_status(id, RecordStatus::Unredeemed, date(2024, 1, 21))
            .await
            .unwrap();
        let reverted = store.get_record(id).await.unwrap();
        assert_eq!(reverted.status, RecordStatus::Unredeemed);
        assert_eq!(reverted.date_redeemed, None);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let store = setup_test().await;
        assert!(matches!(store.get_record(99).await, Err(StoreError::NotFound { id: 99 })));
        assert!(matches!(
            store.update_status(99, RecordStatus::Redeemed, date(2024, 1, 1)).await,
            Err(StoreError::NotFound { id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_list_all_skips_corrupt_rows() {
        let store = setup_test().await;
        store.create_record(&new_record("Good", date(2024, 1, 5), 10.0)).await.unwrap();
        sqlx::query(
            "INSERT INTO pawn_records (name, cccd, items, total_amount, date_pawn, status) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("Broken")
        .bind("X")
        .bind("{not json")
        .bind(5.0)
        .bind("2024-01-06")
        .bind(RecordStatus::Unredeemed.as_stored())
        .execute(store.pool())
        .await
        .unwrap();
        store.create_record(&new_record("Also good", date(2024, 1, 7), 20.0)).await.unwrap();

        let records = store.list_all().await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Also good"]);
    }

    #[tokio::test]
    async fn test_integer_amounts_are_normalized() {
        let store = setup_test().await;
        sqlx::query(
            "INSERT INTO pawn_records (name, cccd, items, total_amount, date_pawn, status) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("Legacy")
        .bind("L")
        .bind(r#"[{"qty":1,"desc":"Watch","wt":1,"purity":"none"}]"#)
        .bind(300_i64)
        .bind("2024-01-06")
        .bind(RecordStatus::Unredeemed.as_stored())
        .execute(store.pool())
        .await
        .unwrap();

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_amount, 300.0);
    }

    #[tokio::test]
    async fn test_query_by_min_date() {
        let store = setup_test().await;
        store.create_record(&new_record("Old", date(2024, 1, 31), 100.0)).await.unwrap();
        let recent = store.create_record(&new_record("New", date(2024, 2, 1), 200.0)).await.unwrap();
        store
            .update_status(recent, RecordStatus::Redeemed, date(2024, 2, 3))
            .await
            .unwrap();

        let rows = store.query_by_min_date(date(2024, 2, 1)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, recent);
        assert_eq!(rows[0].total_amount, 200.0);
        assert_eq!(rows[0].status, RecordStatus::Redeemed);
        assert_eq!(rows[0].date_redeemed, Some(date(2024, 2, 3)));
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pawn.db");

        let store = SqliteRecordStore::open(&path).await.unwrap();
        store.create_record(&new_record("File", date(2024, 1, 5), 1.0)).await.unwrap();
        drop(store);

        assert!(path.exists());
        let reopened = SqliteRecordStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_all().await.unwrap().len(), 1);
    }
}
