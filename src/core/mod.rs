//! Core data types for microhaplotype calling.
//!
//! - [`RefMarker`]: A reference marker with its sequence window and variant positions
//! - [`Variant`]: A tracked variant position inside a marker window
//! - [`ReadRecord`]: One observed (marker, allele sequence, read count) row
//! - [`MarkerGroup`]: A contiguous run of read rows for one marker, with its coverage
//!
//! ## Coordinates
//!
//! Variant positions are genomic coordinates. A marker's reference window starts at
//! `seq_start` and spans `ref_seq.len()` bases, so the reference-frame offset of a
//! variant is `position - seq_start`.

pub mod marker;
pub mod read;
