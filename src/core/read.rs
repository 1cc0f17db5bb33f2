use serde::{Deserialize, Serialize};

/// One qualifying row of the read-count table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRecord {
    /// Marker name (may be absent from the catalog)
    pub marker_name: String,

    /// Allele identifier from the `marker:allele` field
    pub allele_id: String,

    /// True when the row's flag column is the literal "0"
    pub below_threshold: bool,

    /// Candidate allele sequence
    pub sequence: String,

    /// Sum of the two strand counts
    pub read_count: u64,
}

/// A candidate allele handed to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub allele_id: String,
    pub sequence: String,
    pub read_count: u64,
}

impl Candidate {
    pub fn new(allele_id: impl Into<String>, sequence: impl Into<String>, read_count: u64) -> Self {
        Self {
            allele_id: allele_id.into(),
            sequence: sequence.into(),
            read_count,
        }
    }
}

impl From<ReadRecord> for Candidate {
    fn from(record: ReadRecord) -> Self {
        Self {
            allele_id: record.allele_id,
            sequence: record.sequence,
            read_count: record.read_count,
        }
    }
}

/// A contiguous run of read rows sharing one marker name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerGroup {
    pub marker_name: String,

    /// Total reads over every row of the group, filtered or not
    pub coverage: u64,

    /// Rows that passed the minimum-read and below-threshold filters, in input order
    pub candidates: Vec<Candidate>,
}

impl MarkerGroup {
    pub fn new(marker_name: impl Into<String>) -> Self {
        Self {
            marker_name: marker_name.into(),
            coverage: 0,
            candidates: Vec::new(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.coverage = candidates.iter().map(|c| c.read_count).sum();
        self.candidates = candidates;
        self
    }
}
