//! # Domain Module
//!
//! Business rules of the pawn ledger, independent of storage and transport.
//!
//! - **interest**: prorated interest formula
//! - **ledger_service**: record creation, redemption and the record table
//! - **record_table**: filtering, keyword search, row formatting and ordering
//! - **report_service**: month-to-date principal and interest totals
//! - **export_service**: CSV rendering of the record table
//! - **clock**: where "today" comes from
//!
//! ## Business Rules
//!
//! - A record needs a customer name, a national ID and at least one item
//! - Records start unredeemed and carry a redemption date only while redeemed
//! - Interest is 2.5% per 30 days, charged for at least one day
//! - Month-to-date interest only counts days inside the current month

pub mod clock;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod interest;
pub mod ledger_service;
pub mod models;
pub mod record_table;
pub mod report_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::LedgerError;
pub use export_service::ExportService;
pub use ledger_service::LedgerService;
pub use report_service::ReportService;
