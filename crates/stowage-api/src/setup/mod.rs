//! Application setup and initialization
//!
//! Builds the storage backend, the shared state and the router from an
//! already loaded [`Config`].

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use stowage_core::Config;
use stowage_storage::{LocalStorage, Storage};

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(config.upload_dir()));
    tracing::info!(upload_dir = %storage.root().display(), "Local storage configured");

    let state = Arc::new(AppState::new(config.clone(), storage));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
