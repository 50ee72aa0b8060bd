//! # Storage Traits
//!
//! The record store contract shared by the local and remote backends. The
//! domain layer only ever sees `Arc<dyn RecordStorage>`, so it never branches
//! on which backend was selected at startup.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::models::{AggregateRow, NewPawnRecord, PawnRecord, RecordStatus};
use crate::storage::error::{BackendKind, StoreError};

#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Backend chosen at initialization
    fn backend(&self) -> BackendKind;

    /// Insert a new unredeemed record and return its generated id
    async fn create_record(&self, record: &NewPawnRecord) -> Result<i64, StoreError>;

    /// Fetch a single decoded record
    async fn get_record(&self, id: i64) -> Result<PawnRecord, StoreError>;

    /// Set the status in one statement, stamping `date_redeemed = applied_on` for
    /// `Redeemed` and clearing it for `Unredeemed`. Returns `applied_on`.
    async fn update_status(
        &self,
        id: i64,
        status: RecordStatus,
        applied_on: NaiveDate,
    ) -> Result<NaiveDate, StoreError>;

    /// Every decodable record in storage order. Corrupt rows are skipped.
    async fn list_all(&self) -> Result<Vec<PawnRecord>, StoreError>;

    /// Projection of records pawned on or after `from`, without item payloads
    async fn query_by_min_date(&self, from: NaiveDate) -> Result<Vec<AggregateRow>, StoreError>;
}
