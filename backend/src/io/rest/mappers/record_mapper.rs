use chrono::NaiveDate;

use crate::domain::commands::records::{
    AddRecordCommand, RecordViewQuery, RecordViewRow as DomainViewRow,
    RedemptionReceipt as DomainReceipt, SearchField as DomainSearchField,
    SortOrder as DomainSortOrder,
};
use crate::domain::commands::reports::MonthToDateTotals;
use crate::domain::models::{
    PawnItem as DomainItem, PawnRecord as DomainRecord, Purity as DomainPurity,
    RecordStatus as DomainStatus,
};
use crate::domain::report_service::first_of_month;
use crate::storage::codec::{format_date, DATE_FORMAT};
use shared::{
    CreateRecordRequest, MonthToDateResponse, PawnItem as SharedItem, PawnRecord as SharedRecord,
    Purity as SharedPurity, RecordStatus as SharedStatus, RecordViewRequest,
    RecordViewRow as SharedViewRow, RedemptionReceipt as SharedReceipt,
    SearchField as SharedSearchField, SortOrder as SharedSortOrder,
};

pub struct RecordMapper;

impl RecordMapper {
    pub fn to_add_command(request: CreateRecordRequest) -> AddRecordCommand {
        AddRecordCommand {
            customer_name: request.customer_name,
            customer_id: request.customer_id,
            items: request.items.into_iter().map(Self::item_to_domain).collect(),
            total_amount: request.total_amount,
        }
    }

    /// Build the view query, defaulting to the current month up to `today`
    pub fn to_view_query(request: RecordViewRequest, today: NaiveDate) -> Result<RecordViewQuery, String> {
        let date_from = match request.date_from.as_deref() {
            Some(s) if !s.trim().is_empty() => Self::parse_date("date_from", s)?,
            _ => first_of_month(today),
        };
        let date_to = match request.date_to.as_deref() {
            Some(s) if !s.trim().is_empty() => Self::parse_date("date_to", s)?,
            _ => today,
        };

        Ok(RecordViewQuery {
            date_from,
            date_to,
            search_field: match request.search_field {
                SharedSearchField::Name => DomainSearchField::Name,
                SharedSearchField::NationalId => DomainSearchField::NationalId,
                SharedSearchField::ItemDescription => DomainSearchField::ItemDescription,
            },
            keyword: request.keyword,
            sort_order: match request.sort_order {
                SharedSortOrder::None => DomainSortOrder::None,
                SharedSortOrder::UnredeemedFirst => DomainSortOrder::UnredeemedFirst,
                SharedSortOrder::RedeemedFirst => DomainSortOrder::RedeemedFirst,
            },
        })
    }

    pub fn to_dto(record: DomainRecord) -> SharedRecord {
        SharedRecord {
            id: record.id,
            customer_name: record.customer_name,
            customer_id: record.customer_id,
            items: record.items.into_iter().map(Self::item_to_dto).collect(),
            total_amount: record.total_amount,
            date_pawned: format_date(record.date_pawned),
            date_redeemed: record.date_redeemed.map(format_date),
            status: Self::status_to_dto(record.status),
        }
    }

    pub fn view_row_to_dto(row: DomainViewRow) -> SharedViewRow {
        SharedViewRow {
            id: row.id,
            customer_name: row.customer_name,
            customer_id: row.customer_id,
            items_summary: row.items_summary,
            total_amount: row.total_amount,
            date_pawned: format_date(row.date_pawned),
            date_redeemed: row.date_redeemed.map(format_date).unwrap_or_default(),
            status: Self::status_to_dto(row.status),
            interest: row.interest,
        }
    }

    pub fn receipt_to_dto(receipt: DomainReceipt) -> SharedReceipt {
        SharedReceipt {
            id: receipt.id,
            customer_name: receipt.customer_name,
            total_amount: receipt.total_amount,
            date_pawned: format_date(receipt.date_pawned),
            date_redeemed: format_date(receipt.date_redeemed),
            interest: receipt.interest,
        }
    }

    pub fn totals_to_dto(totals: MonthToDateTotals) -> MonthToDateResponse {
        MonthToDateResponse {
            month_start: format_date(totals.month_start),
            as_of: format_date(totals.as_of),
            record_count: totals.record_count,
            total_principal: totals.total_principal,
            total_interest: totals.total_interest,
        }
    }

    pub fn status_to_dto(status: DomainStatus) -> SharedStatus {
        match status {
            DomainStatus::Unredeemed => SharedStatus::Unredeemed,
            DomainStatus::Redeemed => SharedStatus::Redeemed,
        }
    }

    fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .map_err(|_| format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    }

    fn item_to_domain(item: SharedItem) -> DomainItem {
        DomainItem {
            quantity: item.quantity,
            description: item.description,
            weight: item.weight,
            purity: match item.purity {
                SharedPurity::None => DomainPurity::None,
                SharedPurity::Low => DomainPurity::Low,
                SharedPurity::High => DomainPurity::High,
            },
        }
    }

    fn item_to_dto(item: DomainItem) -> SharedItem {
        SharedItem {
            quantity: item.quantity,
            description: item.description,
            weight: item.weight,
            purity: match item.purity {
                DomainPurity::None => SharedPurity::None,
                DomainPurity::Low => SharedPurity::Low,
                DomainPurity::High => SharedPurity::High,
            },
        }
    }
}
