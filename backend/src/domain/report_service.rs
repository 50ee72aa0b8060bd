//! Month-to-date totals for the shop footer.
//!
//! Principal counts every record pawned since the first of the month. Interest
//! only counts the part of each loan that falls inside the current month.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::debug;

use crate::domain::clock::Clock;
use crate::domain::commands::reports::MonthToDateTotals;
use crate::domain::errors::LedgerError;
use crate::domain::interest::prorated_interest;
use crate::domain::models::{AggregateRow, RecordStatus};
use crate::storage::RecordStorage;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn RecordStorage>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Totals as of the service clock's today
    pub async fn current_month_to_date(&self) -> Result<MonthToDateTotals, LedgerError> {
        self.month_to_date(self.clock.today()).await
    }

    pub async fn month_to_date(&self, today: NaiveDate) -> Result<MonthToDateTotals, LedgerError> {
        let month_start = first_of_month(today);
        let rows = self
            .store
            .query_by_min_date(month_start)
            .await
            .map_err(|e| LedgerError::from_store("month_to_date", e))?;

        let totals = summarize(&rows, month_start, today);
        debug!(
            "Month-to-date {}..{}: {} records, principal {:.2}, interest {:.2}",
            month_start, today, totals.record_count, totals.total_principal, totals.total_interest
        );
        Ok(totals)
    }
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Days of interest a record accrues within the month starting at `month_start`
pub fn accrual_days(row: &AggregateRow, month_start: NaiveDate, today: NaiveDate) -> i64 {
    match (row.status, row.date_redeemed) {
        (RecordStatus::Redeemed, Some(redeemed)) if redeemed >= month_start => {
            ((redeemed - month_start).num_days() + 1).max(0)
        }
        (RecordStatus::Redeemed, _) => 0,
        (RecordStatus::Unredeemed, _) => (today - month_start).num_days() + 1,
    }
}

pub fn summarize(rows: &[AggregateRow], month_start: NaiveDate, today: NaiveDate) -> MonthToDateTotals {
    let mut totals = MonthToDateTotals {
        month_start,
        as_of: today,
        record_count: rows.len(),
        total_principal: 0.0,
        total_interest: 0.0,
    };
    for row in rows {
        totals.total_principal += row.total_amount;
        totals.total_interest += prorated_interest(row.total_amount, accrual_days(row, month_start, today));
    }
    totals
}
