//! Allele classification and indel-aware alignment.
//!
//! This module turns grouped read rows into report records:
//!
//! - [`AlleleCaller`]: Runs the filter chain per marker and assembles records
//! - [`align::align`]: Single-indel alignment against the marker reference
//! - [`homopolymer::is_homopolymer`]: Slippage-prone repeat predicate
//! - [`report::AlleleReport`]: Output records and writers
//!
//! ## Filter Chain
//!
//! Each candidate of a marker is checked, in order:
//!
//! 1. **Noise**: `reads / coverage <= noise_cut` is dropped
//! 2. **Homopolymer**: a homopolymer candidate with `reads / valid_reads <= homopolymer_err`
//!    is dropped
//! 3. **Minor**: `reads / valid_reads <= allele_cover` is flagged, or dropped when
//!    minor marking is off
//!
//! `valid_reads` is the sum of reads over candidates that pass the noise check.
//!
//! ## Example
//!
//! ```rust
//! use mh_caller::calling::{run_pipeline, CallingConfig};
//!
//! let markers = "mh01KK-001\tchr1\trs1:104\t100\tACGTACGTAC\n";
//! let reads = "mh01KK-001:10\t10 bases\tACGTACGTAC\t300\t200\n";
//!
//! let output = run_pipeline(markers, reads, &CallingConfig::default()).unwrap();
//! assert_eq!(output.summary.alleles, 1);
//! ```

use serde::Serialize;
use tracing::info;

use crate::catalog::store::MarkerCatalog;
use crate::parsing::reads::{aggregate_reads, ReadAggregation};
use crate::parsing::ParseError;

pub mod align;
pub mod caller;
pub mod config;
pub mod homopolymer;
pub mod report;

pub use caller::{AlleleCaller, CallDecision};
pub use config::CallingConfig;
pub use report::AlleleReport;

/// Counts and warnings for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Qualifying marker definition lines
    pub marker_count: usize,
    /// Read groups analyzed
    pub analyzed_markers: usize,
    /// Accepted alleles over all groups
    pub alleles: usize,
    /// Catalog and read-table warnings, in that order
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Status line for the analysis
    pub fn status(&self) -> String {
        if self.analyzed_markers > 0 {
            format!("{} markers: Analysis completed!", self.analyzed_markers)
        } else {
            "No valid marker!".to_string()
        }
    }
}

/// Records plus summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub records: Vec<AlleleReport>,
    pub summary: RunSummary,
}

/// Call alleles for already-parsed inputs
pub fn call_aggregation(
    catalog: &MarkerCatalog,
    aggregation: &ReadAggregation,
    config: &CallingConfig,
) -> PipelineOutput {
    let caller = AlleleCaller::new(catalog, config.clone());
    let records = caller.call_groups(&aggregation.groups);

    let summary = RunSummary {
        marker_count: catalog.lines_parsed(),
        analyzed_markers: aggregation.groups.len(),
        alleles: records.iter().filter(|r| r.is_allele()).count(),
        warnings: catalog
            .warnings()
            .iter()
            .chain(&aggregation.warnings)
            .cloned()
            .collect(),
    };
    info!("{}", summary.status());

    PipelineOutput { records, summary }
}

/// Parse both inputs and call alleles.
///
/// The config is used as given; validate it first with
/// [`CallingConfig::validated`].
///
/// # Errors
///
/// Returns `ParseError::TooManyRecords` if either input exceeds its limit.
pub fn run_pipeline(
    markers_text: &str,
    reads_text: &str,
    config: &CallingConfig,
) -> Result<PipelineOutput, ParseError> {
    let catalog = MarkerCatalog::from_text(markers_text)?;
    let aggregation = aggregate_reads(reads_text, config.min_read_count)?;
    Ok(call_aggregation(&catalog, &aggregation, config))
}
