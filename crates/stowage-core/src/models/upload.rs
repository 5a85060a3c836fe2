use serde::{Deserialize, Serialize};

/// Metadata describing a stored upload.
///
/// `size` is measured from the file on disk after the write completed; the
/// `content_type` is echoed from the client and never verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub status: String,
    /// Server-generated, unique name of the file inside the upload directory.
    #[serde(rename = "filename")]
    pub stored_filename: String,
    /// Filename exactly as the client sent it.
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
}

impl UploadResult {
    pub fn new(
        stored_filename: impl Into<String>,
        original_name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            status: "success".to_string(),
            stored_filename: stored_filename.into(),
            original_name: original_name.into(),
            size,
            content_type: content_type.into(),
        }
    }
}
