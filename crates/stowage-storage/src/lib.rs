//! Stowage Storage Library
//!
//! This crate provides the storage abstraction used by the upload handler and
//! its local filesystem implementation.
//!
//! # Storage key format
//!
//! Keys are flat file names inside the upload directory:
//! `{sanitized-stem}-{32 hex chars}{extension}`. Keys never contain a path
//! separator or `..`. Key generation lives in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::unique_storage_name;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
