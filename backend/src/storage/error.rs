use std::fmt;
use thiserror::Error;

/// Which persistence backend a store talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded SQLite file
    Local,
    /// Networked MySQL server
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or prepared
    #[error("could not connect to {backend} store: {reason}")]
    ConnectionFailed { backend: BackendKind, reason: String },

    #[error("pawn record {id} not found")]
    NotFound { id: i64 },

    /// A stored row could not be turned back into a record
    #[error("pawn record {id} has an unreadable {field}: {reason}")]
    Decode {
        id: i64,
        field: &'static str,
        reason: String,
    },

    #[error("failed to encode items: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
