//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Every error renders as
//! `{"error": <client message>}` with the status code chosen by
//! [`ErrorMetadata`]; internal details only reach the logs.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use stowage_core::{AppError, ErrorMetadata, LogLevel};
use stowage_storage::StorageError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both IntoResponse and AppError are foreign to this crate).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, error_code, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, error_code, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, error_code, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(ErrorResponse::new(app_error.client_message()))).into_response()
    }
}

/// Map a multipart parsing failure, honouring the configured body limit.
pub fn multipart_error(err: &MultipartError, body_limit: Option<usize>) -> AppError {
    match body_limit {
        Some(limit) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge { limit }
        }
        _ => AppError::MalformedUpload(err.body_text()),
    }
}

/// Map a storage failure. Interrupted upload streams are the client's fault;
/// everything else is a storage failure.
pub fn storage_error(err: StorageError, body_limit: Option<usize>) -> AppError {
    match err {
        StorageError::StreamInterrupted(io_err) => {
            let multipart = io_err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>());
            match multipart {
                Some(multipart) => multipart_error(multipart, body_limit),
                None => AppError::MalformedUpload(io_err.to_string()),
            }
        }
        other => AppError::StorageFailure(other.to_string()),
    }
}

/// Response for a handler that panicked, used by the catch-panic layer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    HttpAppError(AppError::Internal(format!("Handler panicked: {}", detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_storage_error_upload_failed() {
        let storage_err = StorageError::UploadFailed("disk full".to_string());
        match storage_error(storage_err, None) {
            AppError::StorageFailure(msg) => assert!(msg.contains("disk full")),
            other => panic!("Expected StorageFailure variant, got {other:?}"),
        }
    }

    #[test]
    fn test_interrupted_stream_is_client_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        match storage_error(StorageError::StreamInterrupted(io_err), Some(1024)) {
            AppError::MalformedUpload(msg) => assert!(msg.contains("reset by peer")),
            other => panic!("Expected MalformedUpload variant, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = HttpAppError(AppError::MissingField).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json, serde_json::json!({ "error": "file field is required" }));
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let response =
            HttpAppError(AppError::StorageFailure("/srv/uploads: EACCES".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(!text.contains("/srv/uploads"));
        assert!(text.contains("failed to store file"));
    }

    #[test]
    fn test_panic_response_is_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
