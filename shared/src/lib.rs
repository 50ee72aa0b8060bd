use serde::{Deserialize, Serialize};

/// Gold/metal purity grade of a pawned item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purity {
    None,
    Low,
    High,
}

/// One piece of collateral in a pawn record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PawnItem {
    /// Number of identical pieces (must be positive)
    pub quantity: u32,
    pub description: String,
    /// Weight in the shop's weight units (must be positive)
    pub weight: f64,
    pub purity: Purity,
}

/// Redemption status of a pawn record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Unredeemed,
    Redeemed,
}

/// A pawn record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PawnRecord {
    pub id: i64,
    pub customer_name: String,
    /// National ID number of the customer
    pub customer_id: String,
    pub items: Vec<PawnItem>,
    /// Principal advanced to the customer
    pub total_amount: f64,
    /// ISO date (YYYY-MM-DD)
    pub date_pawned: String,
    /// ISO date (YYYY-MM-DD), present only once redeemed
    pub date_redeemed: Option<String>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub customer_name: String,
    pub customer_id: String,
    pub items: Vec<PawnItem>,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordResponse {
    pub id: i64,
}

/// Field a keyword search is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    #[default]
    Name,
    NationalId,
    ItemDescription,
}

/// Status-priority ordering for the record view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    UnredeemedFirst,
    RedeemedFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecordViewRequest {
    /// Inclusive start date (YYYY-MM-DD), defaults to the first of this month
    pub date_from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD), defaults to today
    pub date_to: Option<String>,
    #[serde(default)]
    pub search_field: SearchField,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub sort_order: SortOrder,
}

/// One row of the record table, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordViewRow {
    pub id: i64,
    pub customer_name: String,
    pub customer_id: String,
    /// e.g. "2xRing(1.5); 1xChain(3)"
    pub items_summary: String,
    pub total_amount: f64,
    pub date_pawned: String,
    /// Blank unless the record is redeemed
    pub date_redeemed: String,
    pub status: RecordStatus,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordViewResponse {
    pub rows: Vec<RecordViewRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub date_pawned: String,
    pub date_redeemed: String,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    pub id: i64,
    pub status: RecordStatus,
    /// Date the change was applied (YYYY-MM-DD)
    pub date_applied: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthToDateResponse {
    pub month_start: String,
    pub as_of: String,
    pub record_count: usize,
    pub total_principal: f64,
    pub total_interest: f64,
}
