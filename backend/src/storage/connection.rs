//! Backend selection.
//!
//! The remote store is tried first when configured; any failure falls back to
//! the local SQLite file. Whatever is chosen here is used for the rest of the
//! process lifetime.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::storage::error::StoreError;
use crate::storage::mysql::MySqlRecordStore;
use crate::storage::sqlite::SqliteRecordStore;
use crate::storage::traits::RecordStorage;

/// Open the record store described by `config`.
///
/// Only fails when the local store cannot be opened either.
pub async fn initialize(config: &LedgerConfig) -> Result<Arc<dyn RecordStorage>, StoreError> {
    if let Some(remote) = &config.remote {
        match MySqlRecordStore::connect(remote).await {
            Ok(store) => return Ok(Arc::new(store)),
            Err(e) => warn!("Remote store unavailable, falling back to local store: {}", e),
        }
    } else {
        info!("No remote store configured");
    }

    let store = SqliteRecordStore::open(&config.local_db_path).await?;
    Ok(Arc::new(store))
}
