use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted literal for an unredeemed record. Changing it breaks existing databases.
pub const STATUS_UNREDEEMED: &str = "Chưa Chuộc";
/// Persisted literal for a redeemed record. Changing it breaks existing databases.
pub const STATUS_REDEEMED: &str = "Đã Chuộc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purity {
    None,
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PawnItem {
    pub quantity: u32,
    pub description: String,
    pub weight: f64,
    pub purity: Purity,
}

impl PawnItem {
    /// Display form used in the record table: `{qty}x{desc}({weight})`
    pub fn summary(&self) -> String {
        format!("{}x{}({})", self.quantity, self.description, self.weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Unredeemed,
    Redeemed,
}

impl RecordStatus {
    /// Literal stored in the `status` column
    pub fn as_stored(&self) -> &'static str {
        match self {
            RecordStatus::Unredeemed => STATUS_UNREDEEMED,
            RecordStatus::Redeemed => STATUS_REDEEMED,
        }
    }

    /// Parse the literal stored in the `status` column
    pub fn from_stored(s: &str) -> Result<Self, String> {
        match s.trim() {
            STATUS_UNREDEEMED => Ok(RecordStatus::Unredeemed),
            STATUS_REDEEMED => Ok(RecordStatus::Redeemed),
            other => Err(format!("Invalid record status: {}", other)),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Unredeemed => write!(f, "unredeemed"),
            RecordStatus::Redeemed => write!(f, "redeemed"),
        }
    }
}

/// A pawn transaction as owned by the record store
#[derive(Debug, Clone, PartialEq)]
pub struct PawnRecord {
    pub id: i64,
    pub customer_name: String,
    pub customer_id: String,
    pub items: Vec<PawnItem>,
    pub total_amount: f64,
    pub date_pawned: NaiveDate,
    pub date_redeemed: Option<NaiveDate>,
    pub status: RecordStatus,
}

impl PawnRecord {
    pub fn is_redeemed(&self) -> bool {
        self.status == RecordStatus::Redeemed
    }
}

/// Everything the store needs to insert a record; id and status are store-assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewPawnRecord {
    pub customer_name: String,
    pub customer_id: String,
    pub items: Vec<PawnItem>,
    pub total_amount: f64,
    pub date_pawned: NaiveDate,
}

/// Minimal projection used by month-to-date aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub id: i64,
    pub total_amount: f64,
    pub status: RecordStatus,
    pub date_pawned: NaiveDate,
    pub date_redeemed: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordValidationError {
    #[error("Customer name cannot be empty")]
    EmptyCustomerName,
    #[error("Customer national ID cannot be empty")]
    EmptyCustomerId,
    #[error("At least one item is required")]
    NoItems,
    #[error("Item {index} must have a positive quantity")]
    InvalidQuantity { index: usize },
    #[error("Item {index} must have a positive weight")]
    InvalidWeight { index: usize },
    #[error("Total amount must be a non-negative number")]
    InvalidAmount,
}
