//! # mh-caller
//!
//! A library for calling microhaplotype alleles from amplicon read-count tables.
//!
//! A microhaplotype marker is a short genomic window holding a few closely spaced
//! SNPs. Sequencing one sample yields many distinct read sequences per marker;
//! most are sequencing noise or PCR slippage, and one or two are the true alleles.
//!
//! `mh-caller` groups the read rows of each marker, filters candidates by their
//! share of the marker's coverage, aligns every accepted allele to the marker
//! reference allowing a single indel, and reports the bases at each tracked SNP.
//!
//! ## Features
//!
//! - **Noise filtering**: Drops candidates holding too small a share of coverage
//! - **Homopolymer filtering**: Stricter threshold for slippage-prone sequences
//! - **Minor-allele flagging**: Marks (or drops) weakly supported alleles
//! - **Indel-aware alignment**: One insertion or deletion per allele
//! - **Legacy export**: Tab-separated report compatible with existing pipelines
//!
//! ## Example
//!
//! ```rust
//! use mh_caller::{AlleleCaller, CallingConfig, MarkerCatalog};
//! use mh_caller::parsing::reads::aggregate_reads;
//!
//! let catalog = MarkerCatalog::from_text(
//!     "mh01KK-001\tchr1\trs1:104\t100\tACGTACGTAC\n",
//! ).unwrap();
//! let reads = aggregate_reads(
//!     "mh01KK-001:10\t10 bases\tACGTGCGTAC\t300\t200\n",
//!     100,
//! ).unwrap();
//!
//! let caller = AlleleCaller::new(&catalog, CallingConfig::default());
//! for record in caller.call_groups(&reads.groups) {
//!     println!("{record}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Marker definition storage and lookup
//! - [`core`]: Core data types for markers and read rows
//! - [`calling`]: Filter chain, alignment and report records
//! - [`parsing`]: Input readers for marker and read-count files
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod calling;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use calling::{AlleleCaller, AlleleReport, CallingConfig};
pub use catalog::store::MarkerCatalog;
pub use core::marker::{RefMarker, Variant};
