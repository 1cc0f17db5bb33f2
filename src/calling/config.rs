use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::validation::{clamp_min_read_count, validate_ratio, ValidationError};

/// Default minimum summed read count for a row to become a candidate
pub const DEFAULT_MIN_READ_COUNT: u64 = 100;
/// Default gross-ratio noise floor
pub const DEFAULT_NOISE_CUT: f64 = 0.05;
/// Default valid-ratio floor for homopolymer-flagged candidates
pub const DEFAULT_HOMOPOLYMER_ERR: f64 = 0.15;
/// Default valid-ratio floor separating major from minor alleles
pub const DEFAULT_ALLELE_COVER: f64 = 0.25;

/// Thresholds and switches for one calling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallingConfig {
    /// Minimum summed strand count for a row to be a candidate
    pub min_read_count: u64,
    /// Candidates at or below this share of coverage are noise
    pub noise_cut: f64,
    /// Homopolymer candidates at or below this share of valid reads are dropped
    pub homopolymer_err: f64,
    /// Alleles at or below this share of valid reads are minor
    pub allele_cover: f64,
    /// Keep minor alleles (flagged) instead of dropping them
    pub mark_minor: bool,
    /// Report plain reference bases instead of labelled `id:base` annotations
    pub plain_haplotype: bool,
}

impl Default for CallingConfig {
    fn default() -> Self {
        Self {
            min_read_count: DEFAULT_MIN_READ_COUNT,
            noise_cut: DEFAULT_NOISE_CUT,
            homopolymer_err: DEFAULT_HOMOPOLYMER_ERR,
            allele_cover: DEFAULT_ALLELE_COVER,
            mark_minor: true,
            plain_haplotype: false,
        }
    }
}

impl CallingConfig {
    /// Check thresholds and raise `min_read_count` to its floor.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ThresholdOutOfRange` if a ratio threshold is
    /// not a finite number in `[0, 1]`.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        validate_ratio("noise_cut", self.noise_cut)?;
        validate_ratio("homopolymer_err", self.homopolymer_err)?;
        validate_ratio("allele_cover", self.allele_cover)?;

        let (min_read_count, raised) = clamp_min_read_count(self.min_read_count);
        if raised {
            warn!(
                "Minimum read count {} is below the floor, using {min_read_count}",
                self.min_read_count
            );
        }
        self.min_read_count = min_read_count;

        Ok(self)
    }
}
