//! Error types module
//!
//! All intake failures are unified under `AppError`. Each variant self-describes how it is
//! presented over HTTP through the `ErrorMetadata` trait, so the request boundary can turn
//! any failure into a structured response without leaking internals.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a missing file part
    Debug,
    /// Warning level - for client-induced limits such as oversized bodies
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error kind (e.g., "WRITE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable by resubmitting
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from callers
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFilePart,

    #[error("Multiple image parts in one request")]
    MultipleFileParts,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Timed out reading the upload body")]
    RequestTimeout,

    #[error("Upload directory unavailable: {0}")]
    StorageDirectoryUnavailable(String),

    #[error("Write failure: {0}")]
    WriteFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::MissingFilePart => (400, "MISSING_FILE_PART", true, false, LogLevel::Debug),
        AppError::MultipleFileParts => {
            (400, "MULTIPLE_FILE_PARTS", true, false, LogLevel::Debug)
        }
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::InvalidFileType(_) => (400, "INVALID_FILE_TYPE", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Warn),
        AppError::RequestTimeout => (408, "REQUEST_TIMEOUT", true, false, LogLevel::Warn),
        AppError::StorageDirectoryUnavailable(_) => (
            500,
            "STORAGE_DIRECTORY_UNAVAILABLE",
            true,
            true,
            LogLevel::Error,
        ),
        AppError::WriteFailure(_) => (500, "WRITE_FAILURE", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingFilePart => "MissingFilePart",
            AppError::MultipleFileParts => "MultipleFileParts",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidFileType(_) => "InvalidFileType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::RequestTimeout => "RequestTimeout",
            AppError::StorageDirectoryUnavailable(_) => "StorageDirectoryUnavailable",
            AppError::WriteFailure(_) => "WriteFailure",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingFilePart => "No file uploaded".to_string(),
            AppError::MultipleFileParts => {
                "Only one file may be uploaded per request under the 'image' field".to_string()
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InvalidFileType(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::RequestTimeout => "Timed out reading the upload".to_string(),
            AppError::StorageDirectoryUnavailable(_) => "Upload storage unavailable".to_string(),
            AppError::WriteFailure(_) => "Failed to store upload".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_missing_file_part() {
        let err = AppError::MissingFilePart;
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "MISSING_FILE_PART");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "No file uploaded");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_write_failure_hides_details() {
        let err = AppError::WriteFailure("No space left on device: /srv/uploads/.x.part".into());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "WRITE_FAILURE");
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/srv/uploads"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_directory_unavailable() {
        let err = AppError::StorageDirectoryUnavailable("permission denied".into());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_DIRECTORY_UNAVAILABLE");
        assert_eq!(err.client_message(), "Upload storage unavailable");
    }

    #[test]
    fn test_error_metadata_limits() {
        let err = AppError::PayloadTooLarge("too big".into());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.log_level(), LogLevel::Warn);

        let err = AppError::RequestTimeout;
        assert_eq!(err.http_status_code(), 408);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_metadata_internal_is_sensitive() {
        let err = AppError::Internal("IO error: bad file descriptor".into());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_type(), "Internal");
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_sensitive());
    }
}
