//! Data models for the application
//!
//! Response bodies returned by the upload endpoint.

mod health;
mod upload;

pub use health::HealthResponse;
pub use upload::UploadResult;
