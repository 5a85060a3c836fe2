//! Unique storage key generation.

use stowage_core::split_extension;
use uuid::Uuid;

/// Length of the random identifier embedded in every key.
pub const RANDOM_ID_LEN: usize = 32;

/// Derive a unique storage name from an already sanitized filename.
///
/// A fresh UUID v4, rendered as 32 lowercase hex characters, is appended to
/// the stem and the extension is reattached: `report.pdf` becomes
/// `report-<hex>.pdf`.
pub fn unique_storage_name(sanitized: &str) -> String {
    let (stem, extension) = split_extension(sanitized);
    format!("{}-{}{}", stem, Uuid::new_v4().simple(), extension)
}
