//! `/api/upload`: pre-flight, health check and single-file upload.

use crate::error::{multipart_error, storage_error, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use stowage_core::constants::FILE_FIELD;
use stowage_core::{secure_filename, AppError, HealthResponse, UploadResult};
use tokio_util::io::StreamReader;

/// Content type reported when the client did not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Pre-flight: empty 204, no storage work.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Health check: fixed payload, no storage work.
pub async fn upload_health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::ok()))
}

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> String {
    let mime = content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if mime.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        mime.to_lowercase()
    }
}

/// Store the multipart field named `file` and describe the stored object.
///
/// The field is streamed straight to storage; the first `file` part carrying
/// a filename wins.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResult>, HttpAppError> {
    // A body that is not multipart cannot carry the field.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Upload is not a multipart form");
        AppError::MissingField
    })?;
    let body_limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, body_limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A part without a filename parameter is a plain form value, not a file.
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if original_name.is_empty() {
            return Err(AppError::EmptyFile.into());
        }
        let content_type = normalize_mime_type(field.content_type().unwrap_or_default());
        let safe_name = secure_filename(&original_name);

        let mut reader = Box::pin(StreamReader::new(field.map_err(io::Error::other)));
        let stored = state
            .storage
            .store(&safe_name, &mut reader)
            .await
            .map_err(|e| storage_error(e, body_limit))?;

        tracing::info!(
            stored_filename = %stored.key,
            original_name = %original_name,
            size_bytes = stored.size_bytes,
            content_type = %content_type,
            "File uploaded"
        );

        return Ok(Json(UploadResult::new(
            stored.key,
            original_name,
            stored.size_bytes,
            content_type,
        )));
    }

    Err(AppError::MissingField.into())
}
