//! Record table composition.
//!
//! Turns the full list of stored records into the rows shown to the clerk:
//! date-range filter, keyword search, display formatting and status-priority
//! ordering. Everything here is pure so it can be exercised without a store.

use chrono::NaiveDate;

use crate::domain::commands::records::{RecordViewQuery, RecordViewRow, SearchField, SortOrder};
use crate::domain::interest::compute_interest;
use crate::domain::models::{PawnItem, PawnRecord, RecordStatus};

/// Filter, format and order `records` (given in storage order) for display
pub fn compose_view(
    records: Vec<PawnRecord>,
    query: &RecordViewQuery,
    today: NaiveDate,
) -> Vec<RecordViewRow> {
    let keyword = query.keyword.to_lowercase();

    let mut rows: Vec<RecordViewRow> = records
        .into_iter()
        .filter(|r| within_dates(r, query.date_from, query.date_to))
        .filter(|r| matches_keyword(r, query.search_field, &keyword))
        .map(|r| to_view_row(r, today))
        .collect();

    sort_by_status(&mut rows, query.sort_order);
    rows
}

/// Closed interval on the pawn date
pub fn within_dates(record: &PawnRecord, from: NaiveDate, to: NaiveDate) -> bool {
    from <= record.date_pawned && record.date_pawned <= to
}

/// `keyword` must already be lowercased. An empty keyword matches every record.
pub fn matches_keyword(record: &PawnRecord, field: SearchField, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    match field {
        SearchField::Name => record.customer_name.to_lowercase().contains(keyword),
        SearchField::NationalId => record.customer_id.to_lowercase().contains(keyword),
        SearchField::ItemDescription => record
            .items
            .iter()
            .any(|item| item.description.to_lowercase().contains(keyword)),
    }
}

/// `"{qty}x{desc}({weight})"` for each item, joined by `"; "`
pub fn format_items(items: &[PawnItem]) -> String {
    items
        .iter()
        .map(PawnItem::summary)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Interest to display: up to redemption for redeemed records, up to `today` otherwise
pub fn display_interest(record: &PawnRecord, today: NaiveDate) -> f64 {
    let end = match (record.status, record.date_redeemed) {
        (RecordStatus::Redeemed, Some(redeemed)) => redeemed,
        _ => today,
    };
    compute_interest(record.total_amount, record.date_pawned, end)
}

pub fn to_view_row(record: PawnRecord, today: NaiveDate) -> RecordViewRow {
    let interest = display_interest(&record, today);
    let date_redeemed = if record.is_redeemed() {
        record.date_redeemed
    } else {
        None
    };
    RecordViewRow {
        id: record.id,
        items_summary: format_items(&record.items),
        customer_name: record.customer_name,
        customer_id: record.customer_id,
        total_amount: record.total_amount,
        date_pawned: record.date_pawned,
        date_redeemed,
        status: record.status,
        interest,
    }
}

/// Stable ordering by status group; `SortOrder::None` leaves rows untouched
pub fn sort_by_status(rows: &mut [RecordViewRow], order: SortOrder) {
    let first = match order {
        SortOrder::None => return,
        SortOrder::UnredeemedFirst => RecordStatus::Unredeemed,
        SortOrder::RedeemedFirst => RecordStatus::Redeemed,
    };
    rows.sort_by_key(|row| row.status != first);
}
