//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Account {account_id} currency mismatch: {actual} vs {expected}")]
    CurrencyMismatch {
        account_id: i64,
        expected: String,
        actual: String,
    },

    #[error("Account already exists for owner {owner} in {currency}")]
    AccountAlreadyExists { owner: String, currency: String },

    #[error("Account is still referenced by ledger records: {0}")]
    AccountInUse(i64),

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Request timed out before the transfer committed")]
    Timeout,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transaction integrity unknown: {0}")]
    Integrity(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => AppError::Domain(e),
            StoreError::AccountNotFound(id) => AppError::AccountNotFound(id),
            StoreError::TransferNotFound(id) => AppError::TransferNotFound(id),
            StoreError::EntryNotFound(id) => AppError::EntryNotFound(id),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Cancelled => AppError::Timeout,
            err @ StoreError::Rollback { .. } => AppError::Integrity(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::CurrencyMismatch { .. } => {
                (StatusCode::BAD_REQUEST, "currency_mismatch", Some(self.to_string()))
            }
            AppError::Domain(domain_err) => {
                use crate::domain::DomainError;
                let code = match domain_err {
                    DomainError::SameAccountTransfer => "same_account_transfer",
                    DomainError::InvalidAmount(_) => "invalid_amount",
                    DomainError::InvalidInitialBalance(_) => "invalid_initial_balance",
                    DomainError::EmptyOwner => "invalid_owner",
                    DomainError::Currency(_) => "unsupported_currency",
                    DomainError::InvalidPagination(_) => "invalid_pagination",
                };
                (StatusCode::BAD_REQUEST, code, Some(domain_err.to_string()))
            }

            // 403 Forbidden
            AppError::AccountAlreadyExists { .. } => {
                (StatusCode::FORBIDDEN, "account_already_exists", Some(self.to_string()))
            }

            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
            }
            AppError::TransferNotFound(id) => {
                (StatusCode::NOT_FOUND, "transfer_not_found", Some(id.to_string()))
            }
            AppError::EntryNotFound(id) => {
                (StatusCode::NOT_FOUND, "entry_not_found", Some(id.to_string()))
            }

            // 409 Conflict
            AppError::AccountInUse(id) => {
                (StatusCode::CONFLICT, "account_in_use", Some(id.to_string()))
            }

            // 504 Gateway Timeout
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout", None),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Integrity(msg) => {
                tracing::error!("Transaction integrity unknown: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "integrity_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
