//! CSV export of the record table.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use tracing::info;

use crate::domain::commands::records::RecordViewRow;
use crate::storage::codec::format_date;

const HEADER: [&str; 9] = [
    "id",
    "customer_name",
    "national_id",
    "items",
    "total_amount",
    "date_pawned",
    "date_redeemed",
    "status",
    "interest",
];

#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Render rows as CSV with a header line. Redemption dates are blank for unredeemed rows.
    pub fn export_view_csv(&self, rows: &[RecordViewRow]) -> Result<String> {
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;

        for row in rows {
            writer.write_record([
                row.id.to_string(),
                row.customer_name.clone(),
                row.customer_id.clone(),
                row.items_summary.clone(),
                format!("{:.2}", row.total_amount),
                format_date(row.date_pawned),
                row.date_redeemed.map(format_date).unwrap_or_default(),
                row.status.to_string(),
                format!("{:.2}", row.interest),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
        let csv_data = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;
        info!("Exported {} pawn records to CSV", rows.len());
        Ok(csv_data)
    }

    pub fn export_filename(&self, today: NaiveDate) -> String {
        format!("pawn_records_{}.csv", format_date(today))
    }
}
