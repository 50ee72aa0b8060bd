//! # REST API for Reports

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::{error_response, mappers::RecordMapper};
use crate::AppState;

/// Month-to-date principal and interest totals
pub async fn get_month_to_date(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/month-to-date");

    match state.report_service.current_month_to_date().await {
        Ok(totals) => (StatusCode::OK, Json(RecordMapper::totals_to_dto(totals))).into_response(),
        Err(e) => error_response("Failed to compute month-to-date totals", e),
    }
}
