//! Domain-level command, query and result types.
//!
//! These are used inside the domain layer; the REST layer maps the DTOs in the
//! `shared` crate to and from them.

pub mod records {
    use chrono::NaiveDate;

    use crate::domain::models::{PawnItem, RecordStatus};

    /// Input for creating a pawn record. The pawn date is always today.
    #[derive(Debug, Clone)]
    pub struct AddRecordCommand {
        pub customer_name: String,
        pub customer_id: String,
        pub items: Vec<PawnItem>,
        pub total_amount: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SearchField {
        #[default]
        Name,
        NationalId,
        ItemDescription,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SortOrder {
        /// Keep storage order
        #[default]
        None,
        UnredeemedFirst,
        RedeemedFirst,
    }

    /// Filter and ordering for the record table
    #[derive(Debug, Clone)]
    pub struct RecordViewQuery {
        /// Inclusive
        pub date_from: NaiveDate,
        /// Inclusive
        pub date_to: NaiveDate,
        pub search_field: SearchField,
        /// Case-insensitive substring; empty matches everything
        pub keyword: String,
        pub sort_order: SortOrder,
    }

    /// One display row of the record table
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordViewRow {
        pub id: i64,
        pub customer_name: String,
        pub customer_id: String,
        pub items_summary: String,
        pub total_amount: f64,
        pub date_pawned: NaiveDate,
        /// Only set for redeemed records
        pub date_redeemed: Option<NaiveDate>,
        pub status: RecordStatus,
        pub interest: f64,
    }

    /// Result of redeeming a record, for the receipt shown to the clerk
    #[derive(Debug, Clone, PartialEq)]
    pub struct RedemptionReceipt {
        pub id: i64,
        pub customer_name: String,
        pub total_amount: f64,
        pub date_pawned: NaiveDate,
        pub date_redeemed: NaiveDate,
        pub interest: f64,
    }
}

pub mod reports {
    use chrono::NaiveDate;

    /// Totals over records pawned since the first of the month
    #[derive(Debug, Clone, PartialEq)]
    pub struct MonthToDateTotals {
        pub month_start: NaiveDate,
        pub as_of: NaiveDate,
        pub record_count: usize,
        pub total_principal: f64,
        pub total_interest: f64,
    }
}
