//! # Storage Module
//!
//! Persistence for pawn records. Two interchangeable backends implement
//! [`RecordStorage`]:
//!
//! - **sqlite**: the embedded store kept in a local file
//! - **mysql**: an optional networked store shared between shop terminals
//!
//! [`initialize`] picks one at startup and the rest of the application only
//! sees the trait object. Item lists are serialized by [`codec`], which also
//! normalizes numeric and date columns so both backends return identical
//! records.

pub mod codec;
pub mod connection;
pub mod error;
pub mod mysql;
pub mod sqlite;
pub mod traits;

pub use connection::initialize;
pub use error::{BackendKind, StoreError};
pub use mysql::MySqlRecordStore;
pub use sqlite::SqliteRecordStore;
pub use traits::RecordStorage;
