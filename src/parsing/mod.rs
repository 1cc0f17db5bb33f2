//! Parsers for the two text inputs of a calling run.
//!
//! - **Read-count tables**: STRait Razor style rows, grouped into contiguous
//!   per-marker runs by [`reads::ReadAggregator`]
//! - **Input helpers**: reading plain or gzip-compressed text files and stdin
//!
//! Marker definitions are parsed by [`crate::catalog::store::MarkerCatalog`].
//!
//! ## Read Row Layout
//!
//! | Field | Content | Used |
//! |-------|---------|------|
//! | 0 | `marker:allele` | Yes |
//! | 1 | Length, or `0` for below-threshold rows | Flag only |
//! | 2 | `bases` | No |
//! | 3 | Sequence | Yes |
//! | 4 | Forward count | Yes |
//! | 5 | Reverse count | Yes |

use thiserror::Error;

pub mod input;
pub mod reads;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Too many records: {0} exceeds maximum allowed")]
    TooManyRecords(usize),
}

/// A single malformed record. Recoverable: the record is skipped and the
/// message kept as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct FormatError {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl FormatError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
