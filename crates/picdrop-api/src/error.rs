//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! Handlers return `Result<_, HttpAppError>`. Storage and validation failures convert into
//! it with `?`, so every failure is rendered in one place with a consistent status, body and
//! log level.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use picdrop_core::{AppError, ErrorMetadata, LogLevel};
use picdrop_storage::StorageError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::ValidationError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error kind (e.g. `WRITE_FAILURE`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Internal error text, outside production and only for non-sensitive errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
            details: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from picdrop-core)
///
/// `expose_details` starts off; the handler turns it on from `AppState` outside production.
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub expose_details: bool,
}

impl HttpAppError {
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError {
            error,
            expose_details: false,
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Clients match on this exact body.
        if matches!(app_error, AppError::MissingFilePart) {
            return (status, Json(ErrorResponse::new(app_error.client_message()))).into_response();
        }

        let details = (self.expose_details && !app_error.is_sensitive())
            .then(|| app_error.to_string());

        let body = ErrorResponse {
            error: app_error.client_message(),
            kind: Some(app_error.error_code().to_string()),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Map a multipart parsing failure, keeping body-limit violations distinct from malformed bodies.
pub fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::DirectoryUnavailable(msg) => AppError::StorageDirectoryUnavailable(msg),
            StorageError::WriteFailed(msg) => AppError::WriteFailure(msg),
            StorageError::SourceRead(source) => {
                // The reader wraps the multipart stream, so a client-side failure carries the
                // original multipart error.
                match source
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<MultipartError>())
                {
                    Some(multipart) => multipart_error(multipart),
                    None => AppError::InvalidInput(format!("Failed to read upload: {}", source)),
                }
            }
            StorageError::TooLarge { max } => AppError::PayloadTooLarge(format!(
                "File exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            )),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(msg) => {
                AppError::Internal(format!("Stored file missing: {}", msg))
            }
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        };
        app.into()
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooSmall { .. } => AppError::InvalidInput(err.to_string()),
            ValidationError::MissingExtension
            | ValidationError::InvalidExtension { .. }
            | ValidationError::MissingContentType
            | ValidationError::InvalidContentType { .. }
            | ValidationError::ContentTypeMismatch { .. }
            | ValidationError::UnrecognizedSignature => AppError::InvalidFileType(err.to_string()),
        };
        app.into()
    }
}
