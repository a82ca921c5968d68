//! Error handling for the AgroGenius server
//!
//! Model failures of any kind collapse into a single `ExtractionError` per
//! operation. The UI shows a localized message keyed by the response code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::InputValidationError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::external::ModelError;

/// Structured model operations exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CropPrediction,
    Weather,
    SpeechExtraction,
    RegionalResources,
}

impl Operation {
    /// Error code returned to the UI when the operation fails
    pub fn failure_code(&self) -> &'static str {
        match self {
            Operation::CropPrediction => "PREDICTION_UNAVAILABLE",
            Operation::Weather => "WEATHER_UNAVAILABLE",
            Operation::SpeechExtraction => "SPEECH_PARSE_FAILED",
            Operation::RegionalResources => "RESOURCES_UNAVAILABLE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CropPrediction => "crop prediction",
            Operation::Weather => "weather lookup",
            Operation::SpeechExtraction => "speech extraction",
            Operation::RegionalResources => "regional resources lookup",
        };
        f.write_str(name)
    }
}

/// A structured model call failed; the cause is kept for logging only
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct ExtractionError {
    pub operation: Operation,
    #[source]
    pub source: ModelError,
}

impl ExtractionError {
    pub fn new(operation: Operation, source: ModelError) -> Self {
        Self { operation, source }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputValidationError),

    #[error("Validation error: {0}")]
    Validation(String),

    // Model errors
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // Chat session errors
    #[error("Chat session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Chat session {0} is still awaiting a reply")]
    SessionBusy(Uuid),

    // Internal errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
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
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Extraction(e) => (StatusCode::BAD_GATEWAY, e.operation.failure_code()),
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            AppError::SessionBusy(_) => (StatusCode::CONFLICT, "SESSION_BUSY"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show the user; model causes are not exposed
    fn public_message(&self) -> String {
        match self {
            AppError::Extraction(e) => format!("The {} is temporarily unavailable", e.operation),
            AppError::Configuration(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let error_detail = ErrorDetail {
            code: code.to_string(),
            message: self.public_message(),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_errors_map_to_bad_gateway_with_operation_code() {
        let err = AppError::from(ExtractionError::new(
            Operation::Weather,
            ModelError::TransportFailure("connection refused".to_string()),
        ));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_GATEWAY, "WEATHER_UNAVAILABLE")
        );
        assert!(!err.public_message().contains("connection refused"));
    }

    #[test]
    fn test_session_errors() {
        let id = Uuid::new_v4();
        assert_eq!(
            AppError::SessionBusy(id).status_and_code(),
            (StatusCode::CONFLICT, "SESSION_BUSY")
        );
        assert_eq!(
            AppError::SessionNotFound(id).status_and_code(),
            (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND")
        );
    }
}
