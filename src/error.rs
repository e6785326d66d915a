//! Error types for Depot server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchRecord = 3,
    BadValue = 4,
    InvalidState = 5,
    QuantityExceedsApproved = 6,
    OverReturn = 7,
    OutstandingBalance = 8,
    InvalidCondition = 9,
    DuplicateReport = 10,
    LockedByDamageReport = 11,
    ReferencedRecord = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Illegal status transition: {0}")]
    InvalidState(String),

    #[error("Quantity exceeds approved amount: {0}")]
    QuantityExceedsApproved(String),

    #[error("Return exceeds borrowed quantity: {0}")]
    OverReturn(String),

    #[error("Outstanding balance: {0}")]
    OutstandingBalance(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Duplicate damage report: {0}")]
    DuplicateReport(String),

    #[error("Locked by damage report: {0}")]
    LockedByDamageReport(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::ReferencedRecord, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::InvalidState(msg) => {
                (StatusCode::CONFLICT, ErrorCode::InvalidState, msg.clone())
            }
            AppError::QuantityExceedsApproved(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::QuantityExceedsApproved,
                msg.clone(),
            ),
            AppError::OverReturn(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::OverReturn, msg.clone())
            }
            AppError::OutstandingBalance(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::OutstandingBalance,
                msg.clone(),
            ),
            AppError::InvalidCondition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InvalidCondition,
                msg.clone(),
            ),
            AppError::DuplicateReport(msg) => {
                (StatusCode::CONFLICT, ErrorCode::DuplicateReport, msg.clone())
            }
            AppError::LockedByDamageReport(msg) => (
                StatusCode::CONFLICT,
                ErrorCode::LockedByDamageReport,
                msg.clone(),
            ),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
