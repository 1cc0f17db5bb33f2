//! Read-count table parsing and per-marker grouping.
//!
//! Rows are grouped by **contiguous run**: a new group starts whenever the
//! marker name differs from the previous qualifying row. A marker name that
//! reappears later in the file starts a fresh, independent group.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::read::{Candidate, MarkerGroup, ReadRecord};
use crate::parsing::input::read_text_file;
use crate::parsing::{FormatError, ParseError};
use crate::utils::validation::MAX_READ_LINES;

/// Minimum length of a read-count row
pub const MIN_READ_LINE_LEN: usize = 30;

/// Marker text every read-count row carries
pub const READ_LINE_TAG: &str = "bases";

/// Flag value marking a below-threshold row
const BELOW_THRESHOLD_FLAG: &str = "0";

/// Grouped read rows plus per-row format warnings
#[derive(Debug, Clone, Default)]
pub struct ReadAggregation {
    pub groups: Vec<MarkerGroup>,
    pub warnings: Vec<String>,
    /// Qualifying rows that parsed successfully
    pub rows: usize,
}

/// Single forward pass that closes a [`MarkerGroup`] each time the marker
/// name changes.
#[derive(Debug)]
pub struct ReadAggregator {
    min_read_count: u64,
    current: Option<MarkerGroup>,
}

impl ReadAggregator {
    pub fn new(min_read_count: u64) -> Self {
        Self {
            min_read_count,
            current: None,
        }
    }

    /// Add one row. Returns the previous group if this row closed it.
    ///
    /// # Errors
    ///
    /// Returns a `FormatError` if the row would overflow the coverage of its
    /// group. The aggregator is left unchanged.
    pub fn push(
        &mut self,
        record: ReadRecord,
        line_num: usize,
    ) -> Result<Option<MarkerGroup>, FormatError> {
        let marker_changed = self
            .current
            .as_ref()
            .is_some_and(|g| g.marker_name != record.marker_name);

        if let Some(g) = self.current.as_ref().filter(|_| !marker_changed) {
            if g.coverage.checked_add(record.read_count).is_none() {
                return Err(FormatError::new(
                    line_num,
                    format!("coverage overflow for {}", record.marker_name),
                ));
            }
        }

        let closed = if marker_changed {
            self.current.take()
        } else {
            None
        };

        let group = self
            .current
            .get_or_insert_with(|| MarkerGroup::new(record.marker_name.clone()));

        // Checked above
        group.coverage += record.read_count;
        if record.read_count >= self.min_read_count && !record.below_threshold {
            group.candidates.push(Candidate::from(record));
        }

        if let Some(g) = &closed {
            debug!(
                "Closed group {}: coverage {}, {} candidates",
                g.marker_name,
                g.coverage,
                g.candidates.len()
            );
        }
        Ok(closed)
    }

    /// Close the last open group
    pub fn finish(self) -> Option<MarkerGroup> {
        self.current
    }
}

/// Parse one line of the read-count table.
///
/// Returns `Ok(None)` for lines that do not qualify as read rows (too short or
/// without the `bases` tag).
///
/// # Errors
///
/// Returns a `FormatError` when a qualifying line has too few fields, a
/// malformed `marker:allele` field, a non-ASCII sequence, or non-numeric counts.
pub fn parse_read_line(line: &str, line_num: usize) -> Result<Option<ReadRecord>, FormatError> {
    if line.len() < MIN_READ_LINE_LEN || !line.contains(READ_LINE_TAG) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return Err(FormatError::new(
            line_num,
            format!("read line has {} fields, expected at least 6", fields.len()),
        ));
    }

    let (marker_name, allele_id) = fields[0].split_once(':').ok_or_else(|| {
        FormatError::new(
            line_num,
            format!("expected 'marker:allele' in first field, found '{}'", fields[0]),
        )
    })?;

    let sequence = fields[3];
    if !sequence.is_ascii() {
        return Err(FormatError::new(
            line_num,
            format!("sequence for {marker_name} contains non-ASCII characters"),
        ));
    }

    let parse_count = |field: &str| -> Result<u64, FormatError> {
        field.parse().map_err(|_| {
            FormatError::new(
                line_num,
                format!("invalid read count for {marker_name}: '{field}'"),
            )
        })
    };
    let read_count = parse_count(fields[4])?
        .checked_add(parse_count(fields[5])?)
        .ok_or_else(|| {
            FormatError::new(line_num, format!("read count overflow for {marker_name}"))
        })?;

    Ok(Some(ReadRecord {
        marker_name: marker_name.to_string(),
        allele_id: allele_id.to_string(),
        below_threshold: fields[1] == BELOW_THRESHOLD_FLAG,
        sequence: sequence.to_string(),
        read_count,
    }))
}

/// Parse and group a whole read-count table.
///
/// # Errors
///
/// Returns `ParseError::TooManyRecords` if the table has more qualifying rows
/// than allowed. Malformed rows are skipped and reported in `warnings`.
pub fn aggregate_reads(text: &str, min_read_count: u64) -> Result<ReadAggregation, ParseError> {
    let mut aggregation = ReadAggregation::default();
    let mut aggregator = ReadAggregator::new(min_read_count);

    for (i, line) in text.lines().enumerate() {
        let record = match parse_read_line(line, i + 1) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                warn!("{e}");
                aggregation.warnings.push(e.to_string());
                continue;
            }
        };

        if aggregation.rows >= MAX_READ_LINES {
            return Err(ParseError::TooManyRecords(aggregation.rows));
        }

        match aggregator.push(record, i + 1) {
            Ok(closed) => {
                aggregation.rows += 1;
                if let Some(group) = closed {
                    aggregation.groups.push(group);
                }
            }
            Err(e) => {
                warn!("{e}");
                aggregation.warnings.push(e.to_string());
            }
        }
    }

    if let Some(group) = aggregator.finish() {
        aggregation.groups.push(group);
    }

    Ok(aggregation)
}

/// Parse and group a read-count file (plain, gzip-compressed, or `-` for stdin)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::TooManyRecords` if the row limit is exceeded.
pub fn aggregate_read_file(path: &Path, min_read_count: u64) -> Result<ReadAggregation, ParseError> {
    let text = read_text_file(path)?;
    aggregate_reads(&text, min_read_count)
}
