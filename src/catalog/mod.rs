//! Reference marker catalog.
//!
//! The catalog holds the microhaplotype marker definitions that read groups are
//! called against. It is built once from the marker definition text and is
//! read-only afterwards.
//!
//! ## Definition Format
//!
//! One marker per line, whitespace-delimited:
//!
//! ```text
//! name  chromosome  id:pos [id:pos ...]  seq_start  ref_seq
//! mh01KK-001  chr1  rs1:104  rs2:109  100  ACGTACGTAC
//! ```
//!
//! Lines shorter than 25 characters or without a (case-insensitive) `chr` are
//! skipped, which drops headers and blank lines.
//!
//! ## Example
//!
//! ```rust
//! use mh_caller::MarkerCatalog;
//!
//! let text = "mh01KK-001\tchr1\trs1:104\trs2:109\t100\tACGTACGTAC\n";
//! let catalog = MarkerCatalog::from_text(text).unwrap();
//! assert_eq!(catalog.len(), 1);
//! assert!(catalog.get("mh01KK-001").is_some());
//! ```

pub mod store;
