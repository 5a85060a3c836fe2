//! Error types module
//!
//! Every failure the upload service can report is an [`AppError`] variant.
//! Variants self-describe how they are presented over HTTP through
//! [`ErrorMetadata`]; the API crate only renders what this module decides.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_FAILURE"), used in logs
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("file field is required")]
    MissingField,

    #[error("file is empty")]
    EmptyFile,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Upload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::MissingField => (400, "MISSING_FIELD", LogLevel::Debug),
        AppError::EmptyFile => (400, "EMPTY_FILE", LogLevel::Debug),
        AppError::MalformedUpload(_) => (400, "MALFORMED_UPLOAD", LogLevel::Debug),
        AppError::PayloadTooLarge { .. } => (413, "PAYLOAD_TOO_LARGE", LogLevel::Warn),
        AppError::StorageFailure(_) => (500, "STORAGE_FAILURE", LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingField => "MissingField",
            AppError::EmptyFile => "EmptyFile",
            AppError::MalformedUpload(_) => "MalformedUpload",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::StorageFailure(_) => "StorageFailure",
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

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingField => "file field is required".to_string(),
            AppError::EmptyFile => "file is empty".to_string(),
            AppError::MalformedUpload(_) => "failed to read uploaded file".to_string(),
            AppError::PayloadTooLarge { limit } => format!(
                "file exceeds the maximum upload size of {} bytes",
                limit
            ),
            AppError::StorageFailure(_) => "failed to store file".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }
}
