//! Route configuration and setup.

use crate::error::{panic_response, ErrorResponse};
use crate::handlers::upload::{preflight, upload_file, upload_health};
use crate::middleware::cors_headers_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use std::sync::Arc;
use stowage_core::constants::UPLOAD_ROUTE;
use stowage_core::Config;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let body_limit = match config.max_upload_bytes {
        Some(limit) => {
            tracing::info!(max_upload_bytes = limit, "Upload size limit enabled");
            DefaultBodyLimit::max(limit)
        }
        None => {
            tracing::warn!("No upload size limit configured; set MAX_UPLOAD_BYTES to cap uploads");
            DefaultBodyLimit::disable()
        }
    };

    Router::new()
        .route(
            UPLOAD_ROUTE,
            get(upload_health).post(upload_file).options(preflight),
        )
        .fallback(not_found)
        .layer(body_limit)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(cors_headers_middleware))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not found")))
}
