//! Centralized validation and helper functions.

use std::path::{Path, PathBuf};

/// Maximum number of marker definition lines in a single catalog (DOS protection)
pub const MAX_MARKERS: usize = 100_000;

/// Maximum number of qualifying rows in a single read-count table
pub const MAX_READ_LINES: usize = 5_000_000;

/// Lowest accepted minimum read count
pub const MIN_READ_COUNT_FLOOR: u64 = 10;

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Check if adding another marker would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new marker.
/// Returns true if adding would exceed the limit.
#[must_use]
pub fn check_record_limit(count: usize) -> bool {
    count >= MAX_MARKERS
}

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{name} must be a number between 0 and 1, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("File content appears malformed or invalid")]
    InvalidFileContent,
}

/// Check that a ratio threshold is finite and within `[0, 1]`
///
/// # Errors
///
/// Returns `ValidationError::ThresholdOutOfRange` otherwise.
pub fn validate_ratio(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::ThresholdOutOfRange { name, value })
    }
}

/// Raise a minimum read count to the accepted floor.
///
/// Returns the (possibly raised) value and whether it was changed.
#[must_use]
pub fn clamp_min_read_count(value: u64) -> (u64, bool) {
    if value < MIN_READ_COUNT_FLOOR {
        (MIN_READ_COUNT_FLOOR, true)
    } else {
        (value, false)
    }
}

/// Derive the report file name from a read-count file name.
///
/// `sample_Seq.txt` becomes `sample_MH.txt`; other `.txt` names get `_MH`
/// before the extension; anything else gets `_MH.txt` appended.
#[must_use]
pub fn derive_report_name(reads_name: &str) -> String {
    if let Some(idx) = reads_name.find("_Seq.").filter(|&i| i > 0) {
        let mut name = reads_name.to_string();
        name.replace_range(idx..idx + "_Seq.".len(), "_MH.");
        name
    } else if reads_name.contains(".txt") {
        reads_name.replacen(".txt", "_MH.txt", 1)
    } else {
        format!("{reads_name}_MH.txt")
    }
}

/// Derive the report path next to a read-count file
#[must_use]
pub fn derive_report_path(reads_path: &Path) -> PathBuf {
    let file_name = reads_path
        .file_name()
        .map_or_else(|| "reads".to_string(), |n| n.to_string_lossy().into_owned());
    reads_path.with_file_name(derive_report_name(&file_name))
}

/// Filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.contains('\0') || filename.chars().any(|c| ('\x01'..='\x1F').contains(&c)) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>();

    if sanitized.trim().is_empty() || sanitized.starts_with('.') {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check that posted text looks like text.
///
/// Rejects empty content and content where more than 5% of the bytes are
/// control characters.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFileContent` if the check fails.
pub fn validate_text_content(content: &str) -> Result<(), ValidationError> {
    let bytes = content.as_bytes();
    if bytes.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    let non_printable_count = bytes
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32) || b == 127)
        .count();

    if bytes.len() > 100 && non_printable_count > bytes.len() / 20 {
        return Err(ValidationError::InvalidFileContent);
    }

    Ok(())
}
