//! Ledger service: record creation, redemption and the record table.
//!
//! All writes go through the record store. The service never edits a record
//! in place; it re-reads what it needs and hands back fresh values.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::clock::Clock;
use crate::domain::commands::records::{
    AddRecordCommand, RecordViewQuery, RecordViewRow, RedemptionReceipt,
};
use crate::domain::errors::LedgerError;
use crate::domain::interest::compute_interest;
use crate::domain::models::{NewPawnRecord, PawnRecord, RecordStatus, RecordValidationError};
use crate::domain::record_table;
use crate::storage::RecordStorage;

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn RecordStorage>,
    clock: Arc<dyn Clock>,
    /// Serializes writes so a status check and its update cannot interleave
    write_lock: Arc<Mutex<()>>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn RecordStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Validate and store a new unredeemed record pawned today
    pub async fn add_record(&self, command: AddRecordCommand) -> Result<i64, LedgerError> {
        validate_new_record(&command)?;

        let record = NewPawnRecord {
            customer_name: command.customer_name.trim().to_string(),
            customer_id: command.customer_id.trim().to_string(),
            items: command.items,
            total_amount: command.total_amount,
            date_pawned: self.clock.today(),
        };

        let _guard = self.write_lock.lock().await;
        let id = self
            .store
            .create_record(&record)
            .await
            .map_err(|e| LedgerError::from_store("add_record", e))?;

        info!(
            "Created pawn record {} for {} ({} items, amount {:.2})",
            id,
            record.customer_name,
            record.items.len(),
            record.total_amount
        );
        Ok(id)
    }

    pub async fn get_record(&self, id: i64) -> Result<PawnRecord, LedgerError> {
        self.store
            .get_record(id)
            .await
            .map_err(|e| LedgerError::from_store("get_record", e))
    }

    /// Mark a record redeemed today and work out the interest owed
    pub async fn redeem(&self, id: i64) -> Result<RedemptionReceipt, LedgerError> {
        let _guard = self.write_lock.lock().await;

        let record = self
            .store
            .get_record(id)
            .await
            .map_err(|e| LedgerError::from_store("redeem", e))?;
        if record.is_redeemed() {
            return Err(LedgerError::InvalidTransition {
                id,
                status: record.status,
            });
        }

        let date_redeemed = self
            .store
            .update_status(id, RecordStatus::Redeemed, self.clock.today())
            .await
            .map_err(|e| LedgerError::from_store("redeem", e))?;
        let interest = compute_interest(record.total_amount, record.date_pawned, date_redeemed);

        info!(
            "Redeemed pawn record {} on {} (principal {:.2}, interest {:.2})",
            id, date_redeemed, record.total_amount, interest
        );
        Ok(RedemptionReceipt {
            id,
            customer_name: record.customer_name,
            total_amount: record.total_amount,
            date_pawned: record.date_pawned,
            date_redeemed,
            interest,
        })
    }

    /// Undo a redemption made by mistake. Returns the date the correction was applied.
    pub async fn unredeem(&self, id: i64) -> Result<NaiveDate, LedgerError> {
        let _guard = self.write_lock.lock().await;

        let record = self
            .store
            .get_record(id)
            .await
            .map_err(|e| LedgerError::from_store("unredeem", e))?;
        if !record.is_redeemed() {
            return Err(LedgerError::InvalidTransition {
                id,
                status: record.status,
            });
        }

        let applied_on = self
            .store
            .update_status(id, RecordStatus::Unredeemed, self.clock.today())
            .await
            .map_err(|e| LedgerError::from_store("unredeem", e))?;

        info!("Reverted pawn record {} to unredeemed on {}", id, applied_on);
        Ok(applied_on)
    }

    /// Records for the table view, filtered and ordered per `query`
    pub async fn query_view(&self, query: &RecordViewQuery) -> Result<Vec<RecordViewRow>, LedgerError> {
        let records = self
            .store
            .list_all()
            .await
            .map_err(|e| LedgerError::from_store("query_view", e))?;
        let fetched = records.len();

        let rows = record_table::compose_view(records, query, self.clock.today());
        debug!("Record view: {} of {} records match {:?}", rows.len(), fetched, query);
        Ok(rows)
    }
}

fn validate_new_record(command: &AddRecordCommand) -> Result<(), RecordValidationError> {
    if command.customer_name.trim().is_empty() {
        return Err(RecordValidationError::EmptyCustomerName);
    }
    if command.customer_id.trim().is_empty() {
        return Err(RecordValidationError::EmptyCustomerId);
    }
    if command.items.is_empty() {
        return Err(RecordValidationError::NoItems);
    }
    for (index, item) in command.items.iter().enumerate() {
        if item.quantity == 0 {
            return Err(RecordValidationError::InvalidQuantity { index });
        }
        if !(item.weight.is_finite() && item.weight > 0.0) {
            return Err(RecordValidationError::InvalidWeight { index });
        }
    }
    if !(command.total_amount.is_finite() && command.total_amount >= 0.0) {
        return Err(RecordValidationError::InvalidAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::commands::records::{SearchField, SortOrder};
    use crate::domain::models::{PawnItem, Purity};
    use crate::storage::SqliteRecordStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ring() -> PawnItem {
        PawnItem {
            quantity: 1,
            description: "Nhẫn vàng 18k".to_string(),
            weight: 1.0,
            purity: Purity::High,
        }
    }

    fn command(name: &str, amount: f64) -> AddRecordCommand {
        AddRecordCommand {
            customer_name: name.to_string(),
            customer_id: "079123456789".to_string(),
            items: vec![ring()],
            total_amount: amount,
        }
    }

    async fn setup_store() -> Arc<dyn RecordStorage> {
        Arc::new(SqliteRecordStore::init_test().await.expect("Failed to create test store"))
    }

    fn service_on(store: &Arc<dyn RecordStorage>, today: NaiveDate) -> LedgerService {
        LedgerService::new(store.clone(), Arc::new(FixedClock(today)))
    }

    fn view_query(from: NaiveDate, to: NaiveDate) -> RecordViewQuery {
        RecordViewQuery {
            date_from: from,
            date_to: to,
            search_field: SearchField::Name,
            keyword: String::new(),
            sort_order: SortOrder::None,
        }
    }

    #[tokio::test]
    async fn test_add_record_stamps_today() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 1, 5));

        let id = service.add_record(command("  Pham Van Duc ", 1_000_000.0)).await.unwrap();
        let record = service.get_record(id).await.unwrap();

        assert_eq!(record.customer_name, "Pham Van Duc");
        assert_eq!(record.date_pawned, date(2024, 1, 5));
        assert_eq!(record.status, RecordStatus::Unredeemed);
        assert_eq!(record.date_redeemed, None);
    }

    #[tokio::test]
    async fn test_add_record_validation() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 1, 5));

        let mut no_items = command("A", 1.0);
        no_items.items.clear();
        let mut zero_qty = command("A", 1.0);
        zero_qty.items[0].quantity = 0;
        let mut bad_weight = command("A", 1.0);
        bad_weight.items[0].weight = 0.0;
        let mut blank_id = command("A", 1.0);
        blank_id.customer_id = "   ".to_string();

        let cases = vec![
            (command("", 1.0), RecordValidationError::EmptyCustomerName),
            (blank_id, RecordValidationError::EmptyCustomerId),
            (no_items, RecordValidationError::NoItems),
            (zero_qty, RecordValidationError::InvalidQuantity { index: 0 }),
            (bad_weight, RecordValidationError::InvalidWeight { index: 0 }),
            (command("A", -5.0), RecordValidationError::InvalidAmount),
            (command("A", f64::NAN), RecordValidationError::InvalidAmount),
        ];

        for (input, expected) in cases {
            match service.add_record(input).await {
                Err(LedgerError::Validation(actual)) => assert_eq!(actual, expected),
                other => panic!("expected {:?}, got {:?}", expected, other),
            }
        }
        assert!(store.list_all().await.unwrap().is_empty(), "nothing should be written");
    }

    #[tokio::test]
    async fn test_zero_amount_is_allowed() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 1, 5));
        assert!(service.add_record(command("Free", 0.0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_redeem_returns_receipt_with_interest() {
        let store = setup_store().await;
        let id = service_on(&store, date(2024, 1, 1))
            .add_record(command("Hoa", 1_000_000.0))
            .await
            .unwrap();

        let receipt = service_on(&store, date(2024, 1, 31)).redeem(id).await.unwrap();

        assert_eq!(receipt.id, id);
        assert_eq!(receipt.customer_name, "Hoa");
        assert_eq!(receipt.date_pawned, date(2024, 1, 1));
        assert_eq!(receipt.date_redeemed, date(2024, 1, 31));
        assert!((receipt.interest - 25_000.0).abs() < 1e-6);

        let stored = store.get_record(id).await.unwrap();
        assert_eq!(stored.status, RecordStatus::Redeemed);
        assert_eq!(stored.date_redeemed, Some(date(2024, 1, 31)));
    }

    #[tokio::test]
    async fn test_same_day_redeem_charges_one_day() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 2, 10));
        let id = service.add_record(command("Minh", 300_000.0)).await.unwrap();

        let receipt = service.redeem(id).await.unwrap();
        assert!((receipt.interest - 250.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_redeem_then_unredeem_restores_record() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 3, 3));
        let id = service.add_record(command("Lan", 50_000.0)).await.unwrap();

        service.redeem(id).await.unwrap();
        let applied = service.unredeem(id).await.unwrap();
        assert_eq!(applied, date(2024, 3, 3));

        let record = service.get_record(id).await.unwrap();
        assert_eq!(record.status, RecordStatus::Unredeemed);
        assert_eq!(record.date_redeemed, None);
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 3, 3));
        let id = service.add_record(command("Lan", 50_000.0)).await.unwrap();

        assert!(matches!(
            service.unredeem(id).await,
            Err(LedgerError::InvalidTransition { status: RecordStatus::Unredeemed, .. })
        ));

        service.redeem(id).await.unwrap();
        assert!(matches!(
            service.redeem(id).await,
            Err(LedgerError::InvalidTransition { status: RecordStatus::Redeemed, .. })
        ));
    }

    #[tokio::test]
    async fn test_stale_id_is_not_found() {
        let store = setup_store().await;
        let service = service_on(&store, date(2024, 3, 3));

        assert!(matches!(service.redeem(404).await, Err(LedgerError::NotFound { id: 404 })));
        assert!(matches!(service.unredeem(404).await, Err(LedgerError::NotFound { id: 404 })));
        assert!(matches!(service.get_record(404).await, Err(LedgerError::NotFound { id: 404 })));
    }

    #[tokio::test]
    async fn test_query_view_filters_by_pawn_date() {
        let store = setup_store().await;
        let january = service_on(&store, date(2024, 1, 5))
            .add_record(command("January", 100.0))
            .await
            .unwrap();
        service_on(&store, date(2024, 2, 10))
            .add_record(command("February", 100.0))
            .await
            .unwrap();

        let rows = service_on(&store, date(2024, 2, 20))
            .query_view(&view_query(date(2024, 1, 1), date(2024, 1, 31)))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, january);
    }

    #[tokio::test]
    async fn test_query_view_item_search_and_sort() {
        let store = setup_store().await;
        let day = date(2024, 5, 1);
        let service = service_on(&store, day);

        let mut watch = command("Watch owner", 10.0);
        watch.items.push(PawnItem {
            quantity: 1,
            description: "Rolex Watch".to_string(),
            weight: 0.5,
            purity: Purity::None,
        });
        let a = service.add_record(command("A", 10.0)).await.unwrap();
        let b = service.add_record(watch).await.unwrap();
        let c = service.add_record(command("C", 10.0)).await.unwrap();
        service.redeem(a).await.unwrap();

        let mut query = view_query(day, day);
        query.sort_order = SortOrder::UnredeemedFirst;
        let ids: Vec<i64> = service.query_view(&query).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b, c, a]);

        query.search_field = SearchField::ItemDescription;
        query.keyword = "watch".to_string();
        let rows = service.query_view(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, b);
        assert_eq!(rows[0].items_summary, "1xNhẫn vàng 18k(1); 1xRolex Watch(0.5)");
    }
}
