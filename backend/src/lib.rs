//! # Pawn Ledger Backend
//!
//! Records pawn transactions, tracks redemption and computes accrued interest.
//!
//! - **storage**: record persistence on a local SQLite file or a remote MySQL server
//! - **domain**: ledger rules, interest, record table and month-to-date reports
//! - **io**: REST API exposing the domain services
//! - **config**: JSON configuration
//!
//! ## Architecture
//!
//! ```text
//! REST API (axum)
//!     ↓
//! Domain services (ledger, reports, export)
//!     ↓
//! RecordStorage (SQLite | MySQL)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::LedgerConfig;
use crate::domain::{Clock, ExportService, LedgerService, ReportService, SystemClock};
use crate::io::rest::{record_apis, report_apis};
use crate::storage::{RecordStorage, StoreError};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub ledger_service: LedgerService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger_service: LedgerService::new(store.clone(), clock.clone()),
            report_service: ReportService::new(store, clock.clone()),
            export_service: ExportService::new(),
            clock,
        }
    }
}

/// Open the record store and build the services on top of it
pub async fn initialize_backend(config: &LedgerConfig) -> Result<AppState, StoreError> {
    info!("Setting up record store");
    let store = storage::initialize(config).await?;
    info!("Using {} record store", store.backend());

    info!("Setting up domain services");
    Ok(AppState::new(store, Arc::new(SystemClock)))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/records",
            get(record_apis::list_records).post(record_apis::create_record),
        )
        .route("/records/export", get(record_apis::export_records))
        .route("/records/:id", get(record_apis::get_record))
        .route("/records/:id/redeem", post(record_apis::redeem_record))
        .route("/records/:id/unredeem", post(record_apis::unredeem_record))
        .route("/reports/month-to-date", get(report_apis::get_month_to_date));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
