use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::marker::{RefMarker, Variant};
use crate::parsing::input::read_text_file;
use crate::parsing::{FormatError, ParseError};
use crate::utils::validation::check_record_limit;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read marker definitions: {0}")]
    ReadError(#[from] ParseError),

    #[error("Failed to serialize catalog: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Minimum length of a marker definition line
pub const MIN_MARKER_LINE_LEN: usize = 25;

/// Serializable catalog export format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub created_at: String,
    pub markers: Vec<RefMarker>,
    pub warnings: Vec<String>,
}

/// Marker definitions keyed by marker name
#[derive(Debug, Default)]
pub struct MarkerCatalog {
    /// Markers in first-seen order
    markers: Vec<RefMarker>,

    /// Index: marker name -> index in markers vec
    name_to_index: HashMap<String, usize>,

    /// Out-of-window variants and malformed lines, in input order
    warnings: Vec<String>,

    /// Number of qualifying definition lines, duplicates included
    lines_parsed: usize,
}

impl MarkerCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load marker definitions from a file (plain or gzip-compressed)
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be read or holds too
    /// many markers.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = read_text_file(path)?;
        Ok(Self::from_text(&text)?)
    }

    /// Parse marker definition text.
    ///
    /// Malformed lines and out-of-window variants become warnings; they never
    /// abort the parse.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::TooManyRecords` if the marker limit is exceeded.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        let mut catalog = Self::new();

        for (i, line) in text.lines().enumerate() {
            if !is_marker_line(line) {
                continue;
            }

            if check_record_limit(catalog.lines_parsed) {
                return Err(ParseError::TooManyRecords(catalog.lines_parsed));
            }
            catalog.lines_parsed += 1;

            match parse_marker_line(line, i + 1) {
                Ok((marker, range_warnings)) => {
                    for w in range_warnings {
                        warn!("{w}");
                        catalog.warnings.push(w);
                    }
                    catalog.add_marker(marker);
                }
                Err(e) => {
                    warn!("{e}");
                    catalog.warnings.push(e.to_string());
                }
            }
        }

        info!("{}", catalog.load_status());

        Ok(catalog)
    }

    /// Add a marker, replacing any earlier marker with the same name
    pub fn add_marker(&mut self, marker: RefMarker) {
        if let Some(&idx) = self.name_to_index.get(&marker.name) {
            debug!("Marker {} redefined, keeping the last definition", marker.name);
            self.markers[idx] = marker;
        } else {
            self.name_to_index
                .insert(marker.name.clone(), self.markers.len());
            self.markers.push(marker);
        }
    }

    /// Get a marker by name
    pub fn get(&self, name: &str) -> Option<&RefMarker> {
        self.name_to_index.get(name).map(|&idx| &self.markers[idx])
    }

    /// Markers in first-seen order
    pub fn markers(&self) -> &[RefMarker] {
        &self.markers
    }

    /// Warnings collected while parsing
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of qualifying definition lines seen, the count shown in status
    /// messages
    pub fn lines_parsed(&self) -> usize {
        self.lines_parsed
    }

    /// Status line for the load, keyed on qualifying lines rather than
    /// markers kept
    pub fn load_status(&self) -> String {
        if self.lines_parsed > 0 {
            format!("{} markers: Loading completed!", self.lines_parsed)
        } else {
            "No available marker information!".to_string()
        }
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SerializeError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            created_at: chrono::Utc::now().to_rfc3339(),
            markers: self.markers.clone(),
            warnings: self.warnings.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of distinct markers in catalog
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Check whether a line is a candidate marker definition
fn is_marker_line(line: &str) -> bool {
    line.len() >= MIN_MARKER_LINE_LEN && line.to_lowercase().contains("chr")
}

/// A field belongs to the variant list iff it has a `:` after its first character
fn is_variant_field(field: &str) -> bool {
    field.find(':').is_some_and(|i| i > 0)
}

/// Parse one definition line into a marker plus any range warnings
fn parse_marker_line(line: &str, line_num: usize) -> Result<(RefMarker, Vec<String>), FormatError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FormatError::new(
            line_num,
            format!("marker line has {} fields, expected at least 4", fields.len()),
        ));
    }

    let name = fields[0];
    let seq_start_field = fields[fields.len() - 2];
    let seq_start: i64 = seq_start_field.parse().map_err(|_| {
        FormatError::new(
            line_num,
            format!("invalid sequence start for marker '{name}': '{seq_start_field}'"),
        )
    })?;

    let mut marker = RefMarker::new(name, fields[1], seq_start, fields[fields.len() - 1]);
    let mut warnings = Vec::new();

    for field in fields[2..fields.len() - 2]
        .iter()
        .take_while(|f| is_variant_field(f))
    {
        let (id, pos) = field.split_once(':').unwrap_or((field, ""));
        let position: i64 = pos.parse().map_err(|_| {
            FormatError::new(
                line_num,
                format!("invalid variant position for marker '{name}': '{field}'"),
            )
        })?;

        if !marker.contains(position) {
            warnings.push(format!("Warning: {field} is out of {name} range!"));
        }
        marker.variants.push(Variant::new(id, position));
    }

    Ok((marker, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFS: &str = "Name\tLocus\tSNPs\tStart\tSequence
mh01KK-001\tchr1\trs1:104\trs2:109\t100\tacgtacgtac
mh02KK-002\tchr2\trs3:202\t200\tGGGGCCCCAAAA
";

    #[test]
    fn test_parse_catalog() {
        let catalog = MarkerCatalog::from_text(DEFS).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lines_parsed(), 2);
        assert!(catalog.warnings().is_empty());

        let m = catalog.get("mh01KK-001").unwrap();
        assert_eq!(m.chromosome, "chr1");
        assert_eq!(m.seq_start, 100);
        assert_eq!(m.ref_seq, "ACGTACGTAC");
        assert_eq!(
            m.variants,
            vec![Variant::new("rs1", 104), Variant::new("rs2", 109)]
        );
    }

    #[test]
    fn test_short_and_chrless_lines_skipped() {
        let text = "short chr line\n\
                    a line that is long enough but has no c-h-r token 1 ACGT\n\
                    mh01KK-001\tchr1\trs1:104\t100\tACGTACGTAC\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_chr_match_is_case_insensitive() {
        let text = "mh01KK-001\tCHR1\trs1:104\t100\tACGTACGTAC\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert_eq!(catalog.get("mh01KK-001").unwrap().chromosome, "CHR1");
    }

    #[test]
    fn test_out_of_range_variant_is_kept_with_warning() {
        let text = "mh01KK-001\tchr1\trs1:104\trs9:150\t100\tACGTACGTAC\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        let m = catalog.get("mh01KK-001").unwrap();
        assert_eq!(m.variants.len(), 2);
        assert_eq!(
            catalog.warnings(),
            &["Warning: rs9:150 is out of mh01KK-001 range!".to_string()]
        );
    }

    #[test]
    fn test_duplicate_marker_last_wins() {
        let text = "mh01KK-001\tchr1\trs1:104\t100\tACGTACGTAC\n\
                    mh01KK-001\tchr7\trs5:501\t500\tTTTTGGGGCC\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lines_parsed(), 2);
        assert_eq!(catalog.get("mh01KK-001").unwrap().chromosome, "chr7");
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let text = "mh01KK-001\tchr1\trs1:104\tabc\tACGTACGTAC\n\
                    mh02KK-002\tchr2\trs3:202\t200\tGGGGCCCCAAAA\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("mh02KK-002").is_some());
        assert_eq!(catalog.warnings().len(), 1);
        assert!(catalog.warnings()[0].contains("line 1"));
    }

    #[test]
    fn test_marker_without_variants() {
        let text = "mh03KK-003\tchr3\t300\tACGTACGTACGTACGT\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert!(catalog.get("mh03KK-003").unwrap().variants.is_empty());
    }

    #[test]
    fn test_variant_scan_stops_at_first_plain_field() {
        let text = "mh01KK-001\tchr1\trs1:104\tnote\trs2:105\t100\tACGTACGTAC\n";
        let catalog = MarkerCatalog::from_text(text).unwrap();
        assert_eq!(catalog.get("mh01KK-001").unwrap().variants.len(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = MarkerCatalog::from_text("").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.lines_parsed(), 0);
        assert_eq!(catalog.load_status(), "No available marker information!");
    }

    #[test]
    fn test_load_status_counts_malformed_lines() {
        let catalog =
            MarkerCatalog::from_text("mh01KK-001\tchr1\trs1:104\tabc\tACGTACGTAC\n").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.warnings().len(), 1);
        assert_eq!(catalog.load_status(), "1 markers: Loading completed!");
    }

    #[test]
    fn test_catalog_to_json() {
        let catalog = MarkerCatalog::from_text(DEFS).unwrap();
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"created_at\""));
        assert!(json.contains("mh02KK-002"));
    }
}
