//! Conversions between stored column values and domain types.
//!
//! Items are kept as a JSON array of `{qty, desc, wt, purity}` objects. Unknown
//! keys are ignored on decode so newer writers stay readable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::models::{AggregateRow, PawnItem, PawnRecord, Purity, RecordStatus};
use crate::storage::error::StoreError;

/// Date format used for every stored date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    qty: u32,
    desc: String,
    wt: f64,
    purity: Purity,
}

/// Record columns as read from either backend, before decoding
#[derive(Debug, Clone)]
pub struct RawRecordRow {
    pub id: i64,
    pub name: String,
    pub cccd: String,
    pub items: String,
    pub total_amount: f64,
    pub date_pawn: String,
    pub date_redeemed: Option<String>,
    pub status: String,
}

/// Projection columns as read from either backend
#[derive(Debug, Clone)]
pub struct RawAggregateRow {
    pub id: i64,
    pub total_amount: f64,
    pub date_pawn: String,
    pub date_redeemed: Option<String>,
    pub status: String,
}

pub fn encode_items(items: &[PawnItem]) -> Result<String, StoreError> {
    let stored: Vec<StoredItem> = items
        .iter()
        .map(|item| StoredItem {
            qty: item.quantity,
            desc: item.description.clone(),
            wt: item.weight,
            purity: item.purity,
        })
        .collect();
    Ok(serde_json::to_string(&stored)?)
}

pub fn decode_items(id: i64, payload: &str) -> Result<Vec<PawnItem>, StoreError> {
    let stored: Vec<StoredItem> = serde_json::from_str(payload).map_err(|e| StoreError::Decode {
        id,
        field: "items",
        reason: e.to_string(),
    })?;
    Ok(stored
        .into_iter()
        .map(|s| PawnItem {
            quantity: s.qty,
            description: s.desc,
            weight: s.wt,
            purity: s.purity,
        })
        .collect())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(id: i64, field: &'static str, value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| StoreError::Decode {
        id,
        field,
        reason: format!("'{}': {}", value, e),
    })
}

fn parse_status(id: i64, value: &str) -> Result<RecordStatus, StoreError> {
    RecordStatus::from_stored(value).map_err(|reason| StoreError::Decode {
        id,
        field: "status",
        reason,
    })
}

/// Decode the redemption date and check it agrees with the status
fn parse_redemption(
    id: i64,
    status: RecordStatus,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, StoreError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty());
    match (status, value) {
        (RecordStatus::Redeemed, Some(v)) => parse_date(id, "date_redeemed", v).map(Some),
        (RecordStatus::Redeemed, None) => Err(StoreError::Decode {
            id,
            field: "date_redeemed",
            reason: "redeemed record has no redemption date".to_string(),
        }),
        // Older databases may carry a stale date on unredeemed rows
        (RecordStatus::Unredeemed, _) => Ok(None),
    }
}

pub fn decode_record(raw: RawRecordRow) -> Result<PawnRecord, StoreError> {
    let status = parse_status(raw.id, &raw.status)?;
    Ok(PawnRecord {
        id: raw.id,
        items: decode_items(raw.id, &raw.items)?,
        date_pawned: parse_date(raw.id, "date_pawn", &raw.date_pawn)?,
        date_redeemed: parse_redemption(raw.id, status, raw.date_redeemed.as_deref())?,
        customer_name: raw.name,
        customer_id: raw.cccd,
        total_amount: raw.total_amount,
        status,
    })
}

pub fn decode_aggregate(raw: RawAggregateRow) -> Result<AggregateRow, StoreError> {
    let status = parse_status(raw.id, &raw.status)?;
    Ok(AggregateRow {
        id: raw.id,
        total_amount: raw.total_amount,
        date_pawned: parse_date(raw.id, "date_pawn", &raw.date_pawn)?,
        date_redeemed: parse_redemption(raw.id, status, raw.date_redeemed.as_deref())?,
        status,
    })
}

/// Turn a textual amount (e.g. a MySQL DECIMAL) into the canonical `f64`
pub fn parse_amount(id: i64, value: &str) -> Result<f64, StoreError> {
    value.trim().parse::<f64>().map_err(|e| StoreError::Decode {
        id,
        field: "total_amount",
        reason: format!("'{}': {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_items() -> Vec<PawnItem> {
        vec![
            PawnItem {
                quantity: 2,
                description: "Nhẫn vàng".to_string(),
                weight: 1.25,
                purity: Purity::High,
            },
            PawnItem {
                quantity: 1,
                description: "Chain, \"braided\"".to_string(),
                weight: 0.1,
                purity: Purity::None,
            },
        ]
    }

    fn raw_row() -> RawRecordRow {
        RawRecordRow {
            id: 7,
            name: "Nguyen Van A".to_string(),
            cccd: "001".to_string(),
            items: encode_items(&sample_items()).unwrap(),
            total_amount: 1500.0,
            date_pawn: "2024-03-02".to_string(),
            date_redeemed: None,
            status: RecordStatus::Unredeemed.as_stored().to_string(),
        }
    }

    #[test]
    fn test_items_round_trip() {
        let items = sample_items();
        let encoded = encode_items(&items).unwrap();
        assert_eq!(decode_items(1, &encoded).unwrap(), items);
    }

    #[test]
    fn test_generated_weights_round_trip_exactly() {
        // xorshift64, fixed seed
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let mut weights = Vec::new();
        while weights.len() < 20_000 {
            let uniform = (next() >> 11) as f64 / (1u64 << 53) as f64 * 10_000.0;
            if uniform > 0.0 {
                weights.push(uniform);
            }
            let arbitrary = f64::from_bits(next() >> 1);
            if arbitrary.is_finite() && arbitrary > 0.0 {
                weights.push(arbitrary);
            }
        }

        let items: Vec<PawnItem> = weights
            .iter()
            .map(|&weight| PawnItem {
                quantity: 1,
                description: "Ring".to_string(),
                weight,
                purity: Purity::Low,
            })
            .collect();
        let decoded = decode_items(1, &encode_items(&items).unwrap()).unwrap();

        let mismatches: Vec<(f64, f64)> = items
            .iter()
            .zip(&decoded)
            .filter(|(a, b)| a.weight != b.weight)
            .map(|(a, b)| (a.weight, b.weight))
            .take(5)
            .collect();
        assert!(mismatches.is_empty(), "weights changed: {:?}", mismatches);
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_unknown_item_fields_are_ignored() {
        let payload = r#"[{"qty":1,"desc":"Bracelet","wt":3.5,"purity":"low","karat":18}]"#;
        let items = decode_items(1, payload).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].purity, Purity::Low);
        assert_eq!(items[0].weight, 3.5);
    }

    #[test]
    fn test_corrupt_items_report_record_id() {
        let err = decode_items(42, "not json").unwrap_err();
        match err {
            StoreError::Decode { id, field, .. } => {
                assert_eq!(id, 42);
                assert_eq!(field, "items");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unredeemed_record() {
        let record = decode_record(raw_row()).unwrap();
        assert_eq!(record.status, RecordStatus::Unredeemed);
        assert_eq!(record.date_pawned, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(record.date_redeemed, None);
        assert_eq!(record.items, sample_items());
    }

    #[test]
    fn test_redeemed_without_date_is_rejected() {
        let mut raw = raw_row();
        raw.status = RecordStatus::Redeemed.as_stored().to_string();
        assert!(matches!(
            decode_record(raw),
            Err(StoreError::Decode { field: "date_redeemed", .. })
        ));
    }

    #[test]
    fn test_stale_redemption_date_dropped_for_unredeemed() {
        let mut raw = raw_row();
        raw.date_redeemed = Some("2024-03-05".to_string());
        assert_eq!(decode_record(raw).unwrap().date_redeemed, None);
    }

    #[test]
    fn test_parse_amount_from_decimal_text() {
        assert_eq!(parse_amount(1, "2500000.00").unwrap(), 2_500_000.0);
        assert!(parse_amount(1, "abc").is_err());
    }
}
