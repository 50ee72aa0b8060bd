//! Prorated interest on pawn loans.
//!
//! Interest accrues linearly at [`MONTHLY_INTEREST_RATE`] per
//! [`RATE_PERIOD_DAYS`]-day period.

use chrono::NaiveDate;

/// 2.5% per 30-day period
pub const MONTHLY_INTEREST_RATE: f64 = 0.025;
pub const RATE_PERIOD_DAYS: f64 = 30.0;

/// Interest on `principal` for exactly `days` days, no floor applied
pub fn prorated_interest(principal: f64, days: i64) -> f64 {
    principal * MONTHLY_INTEREST_RATE * days as f64 / RATE_PERIOD_DAYS
}

/// Interest on `principal` from `start` to `end`.
///
/// The span is floored at one day so a same-day redemption still owes a day.
/// Expects `end >= start`; a reversed span is charged as one day.
pub fn compute_interest(principal: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days().max(1);
    prorated_interest(principal, days)
}
