//! # REST API for Pawn Records
//!
//! Endpoints for creating, viewing, redeeming and exporting records.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info};

use crate::io::rest::{error_response, mappers::RecordMapper};
use crate::storage::codec::format_date;
use crate::AppState;
use shared::{
    CreateRecordRequest, CreateRecordResponse, RecordStatus, RecordViewRequest, RecordViewResponse,
    StatusChangeResponse,
};

/// List records for the table view
pub async fn list_records(
    State(state): State<AppState>,
    Query(request): Query<RecordViewRequest>,
) -> impl IntoResponse {
    info!("GET /api/records - query: {:?}", request);

    let query = match RecordMapper::to_view_query(request, state.clock.today()) {
        Ok(query) => query,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match state.ledger_service.query_view(&query).await {
        Ok(rows) => {
            let response = RecordViewResponse {
                rows: rows.into_iter().map(RecordMapper::view_row_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to list records", e),
    }
}

/// Create a new pawn record dated today
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<CreateRecordRequest>,
) -> impl IntoResponse {
    info!("POST /api/records - customer: {}", request.customer_name);

    match state
        .ledger_service
        .add_record(RecordMapper::to_add_command(request))
        .await
    {
        Ok(id) => (StatusCode::CREATED, Json(CreateRecordResponse { id })).into_response(),
        Err(e) => error_response("Failed to create record", e),
    }
}

pub async fn get_record(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/records/{}", id);

    match state.ledger_service.get_record(id).await {
        Ok(record) => (StatusCode::OK, Json(RecordMapper::to_dto(record))).into_response(),
        Err(e) => error_response("Failed to get record", e),
    }
}

/// Redeem a record and return the receipt
pub async fn redeem_record(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("POST /api/records/{}/redeem", id);

    match state.ledger_service.redeem(id).await {
        Ok(receipt) => (StatusCode::OK, Json(RecordMapper::receipt_to_dto(receipt))).into_response(),
        Err(e) => error_response("Failed to redeem record", e),
    }
}

/// Revert a mistaken redemption
pub async fn unredeem_record(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("POST /api/records/{}/unredeem", id);

    match state.ledger_service.unredeem(id).await {
        Ok(applied_on) => {
            let response = StatusChangeResponse {
                id,
                status: RecordStatus::Unredeemed,
                date_applied: format_date(applied_on),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to unredeem record", e),
    }
}

/// Download the current record view as CSV
pub async fn export_records(
    State(state): State<AppState>,
    Query(request): Query<RecordViewRequest>,
) -> Response {
    info!("GET /api/records/export - query: {:?}", request);

    let today = state.clock.today();
    let query = match RecordMapper::to_view_query(request, today) {
        Ok(query) => query,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let rows = match state.ledger_service.query_view(&query).await {
        Ok(rows) => rows,
        Err(e) => return error_response("Failed to load records for export", e),
    };

    match state.export_service.export_view_csv(&rows) {
        Ok(csv_data) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                state.export_service.export_filename(today)
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv_data,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to export records: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting records").into_response()
        }
    }
}
