//! Report records and writers.
//!
//! The legacy export layout is tab-separated, one line per record, with an
//! empty line closing each marker. Allele lines carry nine columns:
//!
//! ```text
//! marker:index  chrom:pos  descriptor  bases  auxiliary  reads  valid  gross  flag
//! ```
//!
//! Diagnostic lines carry the marker, its coverage and a note instead.

use std::fmt;
use std::io::Write;

use serde::Serialize;

use crate::calling::align::IndelKind;

/// Note written for read groups whose marker is not in the catalog
pub const NO_REFERENCE_NOTE: &str = "No Ref. Info.";

/// Note written for read groups without any read above the noise cut
pub const NO_VALID_READ_NOTE: &str = "No valid read!";

/// Base shown for a variant offset outside the reference window
pub const MISSING_BASE: char = 'N';

/// One tracked variant of a called allele
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaplotypeSite {
    pub variant_id: String,
    pub position: i64,
    pub ref_base: char,
    pub allele_base: char,
    pub differs: bool,
}

/// A difference from the reference outside the tracked variant positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuxVariant {
    Indel {
        position: i64,
        kind: IndelKind,
        sequence: String,
        homopolymer: bool,
    },
    Substitution {
        position: i64,
        ref_base: char,
        alt_base: char,
    },
}

impl fmt::Display for AuxVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indel {
                position,
                kind,
                sequence,
                homopolymer,
            } => {
                write!(f, "{position}{}[{sequence}]", kind.sign())?;
                if *homopolymer {
                    write!(f, "@")?;
                }
                Ok(())
            }
            Self::Substitution {
                position,
                ref_base,
                alt_base,
            } => write!(f, "{position}{ref_base}>{alt_base}"),
        }
    }
}

/// An accepted allele
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleRecord {
    pub marker: String,
    /// 1-based index among the marker's accepted alleles
    pub allele_index: usize,
    /// Allele identifier from the read table
    pub allele_id: String,
    /// `chromosome:first_variant_position`
    pub locus: String,
    pub sites: Vec<HaplotypeSite>,
    /// Haplotype column as written to the report
    pub descriptor: String,
    pub aux_variants: Vec<AuxVariant>,
    pub read_count: u64,
    pub valid_ratio: f64,
    pub gross_ratio: f64,
    pub homopolymer: bool,
    pub minor: bool,
}

impl AlleleRecord {
    /// Allele bases at the tracked variant positions
    pub fn haplotype_bases(&self) -> String {
        self.sites.iter().map(|s| s.allele_base).collect()
    }

    /// Space-separated auxiliary variant tokens
    pub fn aux_string(&self) -> String {
        self.aux_variants
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Minor-allele flag column
    pub fn flag(&self) -> char {
        if self.minor {
            '<'
        } else {
            ' '
        }
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlleleReport {
    Allele(AlleleRecord),
    NoReference { marker: String, coverage: u64 },
    NoValidRead { marker: String, coverage: u64 },
    Separator,
}

impl AlleleReport {
    pub fn is_allele(&self) -> bool {
        matches!(self, Self::Allele(_))
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

impl fmt::Display for AlleleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allele(r) => write!(
                f,
                "{}:{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.marker,
                r.allele_index,
                r.locus,
                r.descriptor,
                r.haplotype_bases(),
                r.aux_string(),
                r.read_count,
                format_ratio(r.valid_ratio),
                format_ratio(r.gross_ratio),
                r.flag(),
            ),
            Self::NoReference { marker, coverage } => {
                write!(f, "{marker}\t{coverage}\t{NO_REFERENCE_NOTE}")
            }
            Self::NoValidRead { marker, coverage } => {
                write!(f, "{marker}:0.0\t{coverage}\t{NO_VALID_READ_NOTE}")
            }
            Self::Separator => Ok(()),
        }
    }
}

/// Format a ratio with three decimals.
///
/// Rounds the exact binary value, so `0.0375` (stored just below the tie)
/// gives `0.037`. Exact ties round up: those are the odd multiples of 1/16,
/// where scaling by 16 and 1000 is exact.
pub fn format_ratio(value: f64) -> String {
    let sixteenths = value * 16.0;
    if sixteenths.fract() == 0.0 && sixteenths % 2.0 == 1.0 {
        format!("{:.3}", (value * 1000.0).ceil() / 1000.0)
    } else {
        format!("{value:.3}")
    }
}

/// Render records in the legacy export layout, lines joined by `\n`
pub fn to_legacy_text(records: &[AlleleReport]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write records in the legacy export layout. The trailing separator already
/// ends the text with a newline.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_legacy<W: Write>(out: &mut W, records: &[AlleleReport]) -> std::io::Result<()> {
    out.write_all(to_legacy_text(records).as_bytes())
}

/// Write records as a headered table with one column per field.
/// Separators are dropped.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_tsv<W: Write>(out: &mut W, records: &[AlleleReport]) -> std::io::Result<()> {
    writeln!(
        out,
        "marker\tallele\tallele_id\tlocus\thaplotype\tbases\tauxiliary\treads\tvalid_ratio\tgross_ratio\tminor\tcoverage\tnote"
    )?;

    for record in records {
        match record {
            AlleleReport::Allele(r) => writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t\t",
                r.marker,
                r.allele_index,
                r.allele_id,
                r.locus,
                r.descriptor.trim_end(),
                r.haplotype_bases(),
                r.aux_string(),
                r.read_count,
                format_ratio(r.valid_ratio),
                format_ratio(r.gross_ratio),
                r.minor,
            )?,
            AlleleReport::NoReference { marker, coverage } => writeln!(
                out,
                "{marker}\t\t\t\t\t\t\t\t\t\t\t{coverage}\t{NO_REFERENCE_NOTE}"
            )?,
            AlleleReport::NoValidRead { marker, coverage } => writeln!(
                out,
                "{marker}\t\t\t\t\t\t\t\t\t\t\t{coverage}\t{NO_VALID_READ_NOTE}"
            )?,
            AlleleReport::Separator => {}
        }
    }

    Ok(())
}
