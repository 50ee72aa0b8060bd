//! Networked MySQL record store.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RemoteDbConfig;
use crate::domain::models::{AggregateRow, NewPawnRecord, PawnRecord, RecordStatus};
use crate::storage::codec::{self, RawAggregateRow, RawRecordRow};
use crate::storage::error::{BackendKind, StoreError};
use crate::storage::traits::RecordStorage;

/// MySQL-backed implementation of [`RecordStorage`]
#[derive(Clone)]
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    /// Connect to the configured server, giving up after `connect_timeout_secs`
    pub async fn connect(config: &RemoteDbConfig) -> Result<Self, StoreError> {
        let timeout = Duration::from_secs(config.connect_timeout_secs.max(1));
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .charset("utf8mb4");

        let connecting = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_with(options);

        let pool = match tokio::time::timeout(timeout, connecting).await {
            Ok(Ok(pool)) => pool,
            Ok(Err(e)) => {
                return Err(StoreError::ConnectionFailed {
                    backend: BackendKind::Remote,
                    reason: format!("{}:{}: {}", config.host, config.port, e),
                })
            }
            Err(_) => {
                return Err(StoreError::ConnectionFailed {
                    backend: BackendKind::Remote,
                    reason: format!("{}:{}: timed out after {:?}", config.host, config.port, timeout),
                })
            }
        };

        Self::setup_schema(&pool).await.map_err(|e| StoreError::ConnectionFailed {
            backend: BackendKind::Remote,
            reason: format!("schema setup failed: {}", e),
        })?;

        info!(
            "Connected to remote pawn store {}@{}:{}/{}",
            config.user, config.host, config.port, config.database
        );
        Ok(Self { pool })
    }

    async fn setup_schema(pool: &MySqlPool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pawn_records (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                name TEXT,
                cccd TEXT,
                items TEXT,
                total_amount DOUBLE,
                date_pawn TEXT,
                date_redeemed TEXT,
                status TEXT
            ) CHARACTER SET utf8mb4
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

/// Read `total_amount` as `f64` whether the column is DOUBLE, an integer type or DECIMAL
fn read_amount(row: &MySqlRow, id: i64) -> Result<f64, StoreError> {
    if let Ok(value) = row.try_get::<f64, _>("total_amount") {
        return Ok(value);
    }
    if let Ok(value) = row.try_get::<f32, _>("total_amount") {
        return Ok(f64::from(value));
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

fn read_text(row: &MySqlRow, id: i64, column: &'static str) -> Result<Option<String>, StoreError> {
    row.try_get::<Option<String>, _>(column)
        .map_err(|e| StoreError::Decode {
            id,
            field: column,
            reason: e.to_string(),
        })
}

fn read_record(row: &MySqlRow) -> Result<PawnRecord, StoreError> {
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

fn read_aggregate(row: &MySqlRow) -> Result<AggregateRow, StoreError> {
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
impl RecordStorage for MySqlRecordStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Remote
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

        let id = result.last_insert_id() as i64;
        debug!("Inserted pawn record {} into remote store", id);
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

        // MySQL counts changed rows, so an unchanged row also reports zero
        if result.rows_affected() == 0 && !self.record_exists(id).await? {
            return Err(StoreError::NotFound { id });
        }
        debug!("Remote store set record {} to {} on {}", id, status, applied_on);
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

    #[tokio::test]
    async fn test_unreachable_server_reports_connection_failure() {
        let config = RemoteDbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "pawn".to_string(),
            password: "secret".to_string(),
            database: "pawnshop".to_string(),
            connect_timeout_secs: 2,
        };

        match MySqlRecordStore::connect(&config).await {
            Err(StoreError::ConnectionFailed { backend, reason }) => {
                assert_eq!(backend, BackendKind::Remote);
                assert!(reason.contains("127.0.0.1:1"));
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("connection to a closed port should fail"),
        }
    }
}
