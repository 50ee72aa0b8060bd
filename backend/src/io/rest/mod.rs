//! # REST API Interface Layer
//!
//! HTTP endpoints for the pawn ledger. Handlers deserialize the `shared`
//! DTOs, call the domain services and translate domain errors into status
//! codes:
//!
//! - validation failures and malformed queries: 400
//! - unknown record ids: 404
//! - status changes that do not apply: 409
//! - storage failures: 500

pub mod mappers;
pub mod record_apis;
pub mod report_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::LedgerError;

/// Log a domain error and turn it into an HTTP response
pub fn error_response(context: &str, err: LedgerError) -> Response {
    let status = match &err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        LedgerError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("{}: {}", context, err);
    (status, err.to_string()).into_response()
}
