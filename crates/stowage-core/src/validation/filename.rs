//! Client filename sanitization
//!
//! Uploaded filenames are attacker-controlled. [`secure_filename`] reduces any
//! input to a single, non-hidden path component built from `[A-Za-z0-9_.-]`,
//! so joining it onto the upload directory can never leave that directory.

use crate::constants::{FALLBACK_FILENAME, MAX_SANITIZED_FILENAME_LEN};
use unicode_normalization::UnicodeNormalization;

/// Device names Windows refuses as file names, regardless of extension.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Sanitize a client-supplied filename into a safe single path component.
///
/// The name is NFKD-decomposed and what is left outside ASCII is dropped, so
/// accented letters keep their base letter. Path separators split the name into
/// words that are re-joined with `_` (whitespace and control characters act
/// as separators too), `.` and `..` segments vanish, and everything outside
/// `[A-Za-z0-9_.-]` is dropped. Runs of dots collapse to one and
/// leading/trailing dots or underscores are stripped, so `..` and hidden
/// files cannot survive. The result is never empty.
///
/// ```
/// use stowage_core::secure_filename;
///
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// assert_eq!(secure_filename("My Report (final).pdf"), "My_Report_final.pdf");
/// ```
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
    let words: Vec<&str> = ascii
        .split(|c: char| c == '/' || c == '\\' || c.is_ascii_whitespace() || c.is_ascii_control())
        .filter(|word| !word.is_empty() && !word.chars().all(|c| c == '.'))
        .collect();
    let joined = words.join("_");

    let mut cleaned = String::with_capacity(joined.len());
    for c in joined.chars().filter(|c| is_allowed(*c)) {
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }

    let mut name = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();

    if name.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let device = name.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&device.as_str()) {
        name.insert(0, '_');
    }

    truncate_preserving_extension(name)
}

/// Split a filename into stem and extension (the extension keeps its dot).
///
/// Only the last dot counts, and a leading or trailing dot is not an
/// extension separator: `archive.tar.gz` gives `("archive.tar", ".gz")`,
/// `README` gives `("README", "")`.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx < filename.len() - 1 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

fn truncate_preserving_extension(name: String) -> String {
    if name.len() <= MAX_SANITIZED_FILENAME_LEN {
        return name;
    }

    let (stem, extension) = split_extension(&name);
    // Sanitized names are pure ASCII, so byte offsets are char boundaries.
    let truncated = if extension.len() < MAX_SANITIZED_FILENAME_LEN / 2 {
        let stem = &stem[..MAX_SANITIZED_FILENAME_LEN - extension.len()];
        format!("{}{}", stem.trim_end_matches(['.', '_']), extension)
    } else {
        name[..MAX_SANITIZED_FILENAME_LEN]
            .trim_end_matches(['.', '_'])
            .to_string()
    };

    if truncated.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        truncated
    }
}
