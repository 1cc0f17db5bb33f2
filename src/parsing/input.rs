//! Reading input text from files or stdin.
//!
//! Files ending in `.gz` or `.bgz` are decompressed on the fly. Bytes that are
//! not valid UTF-8 are replaced rather than rejected, since read tables from
//! older pipelines are sometimes written in legacy encodings.

use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::parsing::ParseError;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Check if the path means stdin
pub fn is_stdin(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

/// Read a whole text input into memory.
///
/// `-` reads from stdin.
///
/// # Errors
///
/// Returns `ParseError::Io` if the input cannot be read or decompressed, or
/// `ParseError::InvalidFormat` if it holds NUL bytes.
pub fn read_text_file(path: &Path) -> Result<String, ParseError> {
    let mut bytes = Vec::new();

    if is_stdin(path) {
        std::io::stdin().read_to_end(&mut bytes)?;
    } else if is_gzipped(path) {
        let file = std::fs::File::open(path)?;
        MultiGzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        bytes = std::fs::read(path)?;
    }

    if bytes.contains(&0) {
        return Err(ParseError::InvalidFormat(format!(
            "{} appears to be binary, expected text",
            path.display()
        )));
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
