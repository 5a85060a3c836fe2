//! Stowage Core Library
//!
//! This crate provides the configuration, error taxonomy, response models and
//! filename validation shared by the storage backend and the HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{HealthResponse, UploadResult};
pub use validation::{secure_filename, split_extension};
