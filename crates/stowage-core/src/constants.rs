//! Shared constants

/// Route serving uploads, health checks and pre-flight requests.
pub const UPLOAD_ROUTE: &str = "/api/upload";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Directory name used when `UPLOAD_DIR` is not set.
pub const DEFAULT_UPLOAD_DIR_NAME: &str = "uploads";

pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Name used when sanitization leaves nothing of the client filename.
pub const FALLBACK_FILENAME: &str = "upload";

/// Upper bound on a sanitized filename, leaving room for the random suffix.
pub const MAX_SANITIZED_FILENAME_LEN: usize = 200;
