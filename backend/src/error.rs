//! Error handling for the Textile Stock Ledger
//!
//! Every ledger operation returns a typed failure; the HTTP layer maps it to a
//! status code and a JSON body. Nothing is retried automatically.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{Location, QuantityOverflow};
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("No Poka selected for {0}")]
    EmptySelection(String),

    #[error("Production batch contains no Poka")]
    EmptyBatch,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Lookup errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{} Poka not active at {location}", .ids.len())]
    PokaNotFound { location: Location, ids: Vec<Uuid> },

    // Business logic errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Compound operation could not complete: {0}")]
    NonAtomicFailure(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether the failure is a lookup miss (unknown, moved or sold Poka)
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::PokaNotFound { .. })
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<QuantityOverflow> for AppError {
    fn from(err: QuantityOverflow) -> Self {
        AppError::validation("quantity", err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poka_ids: Option<Vec<Uuid>>,
}

impl ErrorDetail {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
            field: None,
            poka_ids: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::EmptySelection(operation) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "EMPTY_SELECTION",
                    format!("Please select at least one Poka for {}", operation),
                ),
            ),
            AppError::EmptyBatch => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "EMPTY_BATCH",
                    "Please add at least one Poka entry".to_string(),
                ),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    field: Some("poka_no".to_string()),
                    ..ErrorDetail::new(
                        "DUPLICATE_ENTRY",
                        format!("A record with this {} already exists", field),
                    )
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::PokaNotFound { location, ids } => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    poka_ids: Some(ids.clone()),
                    ..ErrorDetail::new(
                        "POKA_NOT_FOUND",
                        format!(
                            "{} selected Poka are no longer in {} stock",
                            ids.len(),
                            location
                        ),
                    )
                },
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INSUFFICIENT_STOCK", msg.clone()),
            ),
            AppError::NonAtomicFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "NON_ATOMIC_FAILURE",
                    "The operation could not be completed and was rolled back".to_string(),
                ),
            ),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("STORAGE_ERROR", format!("Storage error: {}", msg)),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::validation("kg", "Quantity must be greater than 0"),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::EmptySelection("transfer".into()), StatusCode::BAD_REQUEST),
            (AppError::EmptyBatch, StatusCode::BAD_REQUEST),
            (AppError::DuplicateEntry("poka_no P1".into()), StatusCode::CONFLICT),
            (
                AppError::PokaNotFound { location: Location::Birgunj, ids: vec![Uuid::new_v4()] },
                StatusCode::NOT_FOUND,
            ),
            (AppError::InsufficientStock("yarn".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NonAtomicFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_config_error_is_a_configuration_error() {
        let err = AppError::from(config::ConfigError::Message("bad port".into()));
        assert!(matches!(err, AppError::Configuration(ref msg) if msg == "bad port"));
    }

    #[test]
    fn test_quantity_overflow_is_a_validation_error() {
        match AppError::from(QuantityOverflow) {
            AppError::Validation { field, .. } => assert_eq!(field, "quantity"),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(AppError::NotFound("Ledger".into()).is_not_found());
        let missing = AppError::PokaNotFound {
            location: Location::Biratnagar,
            ids: vec![],
        };
        assert!(missing.is_not_found());
        assert!(!AppError::EmptyBatch.is_not_found());
    }
}
