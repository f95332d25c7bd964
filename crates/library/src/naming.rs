//! Filesystem-safe naming
//!
//! Maps display names onto the on-disk library layout: one directory per
//! author under the library root, book files named `<title> - <author><ext>`.

use bookden_core::AppError;

/// Marker an operator types for anthologies with no single author
const VARIOUS_AUTHORS_MARKER: &str = "AA.VV.";

/// Canonical directory name for the various-authors marker
const VARIOUS_AUTHORS_DIR: &str = "AAVV";

/// Characters that are illegal in file names on at least one supported
/// platform (Windows is the strictest)
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Windows reserved device names, compared against the portion of the
/// file name before its first dot
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const MAX_FILENAME_BYTES: usize = 255;

/// Normalizes an author display name into a filesystem-safe path segment.
///
/// Empty input maps to an empty string (the caller decides whether that is
/// an error). The trimmed, case-insensitive various-authors marker maps to
/// its canonical token; otherwise periods are stripped and everything else
/// (case, spaces) is preserved. Idempotent.
pub fn normalize_author(author: &str) -> String {
    let trimmed = author.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.eq_ignore_ascii_case(VARIOUS_AUTHORS_MARKER) {
        return VARIOUS_AUTHORS_DIR.to_string();
    }
    trimmed.replace('.', "")
}

/// Composes the library file name for a book: `<title> - <author><ext>`.
/// `extension` includes its leading dot and keeps the source file's case.
pub fn compose_filename(title: &str, author: &str, extension: &str) -> String {
    format!("{} - {}{}", title, author, extension)
}

/// Validates a composed file name against universal platform rules before
/// any filesystem mutation. Title and author come straight from user input,
/// so the composed name can still carry characters the target filesystem
/// rejects.
pub fn validate_filename(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("file name is empty"));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(AppError::validation(format!(
            "file name exceeds {} bytes: '{}'",
            MAX_FILENAME_BYTES, name
        )));
    }
    if let Some(bad) = name.chars().find(|c| c.is_control() || ILLEGAL_CHARS.contains(c)) {
        return Err(AppError::validation(format!(
            "file name contains illegal character {:?}: '{}'",
            bad, name
        )));
    }
    if name.ends_with('.') || name.ends_with(' ') {
        return Err(AppError::validation(format!(
            "file name must not end with a dot or space: '{}'",
            name
        )));
    }
    let stem = name.split('.').next().unwrap_or(name);
    if RESERVED_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        return Err(AppError::validation(format!(
            "file name uses a reserved device name: '{}'",
            name
        )));
    }
    Ok(())
}
