use thiserror::Error;

use crate::domain::models::{RecordStatus, RecordValidationError};
use crate::storage::StoreError;

/// Failures surfaced by the ledger and report services
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input rejected before anything was written
    #[error("invalid pawn record: {0}")]
    Validation(#[from] RecordValidationError),

    #[error("pawn record {id} not found")]
    NotFound { id: i64 },

    /// The requested status change does not apply to the record's current status
    #[error("pawn record {id} is already {status}")]
    InvalidTransition { id: i64, status: RecordStatus },

    #[error("storage failure during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// Wrap a store error with the operation that hit it. Missing records keep their own variant.
    pub fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => LedgerError::NotFound { id },
            source => LedgerError::Storage { operation, source },
        }
    }
}
