//! Homopolymer artifact detection.

/// Length of a single-base run that marks a homopolymer
pub const HOMOPOLYMER_RUN: usize = 8;

/// Dinucleotide repeat checked in addition to single-base runs
const AT_REPEAT: &str = "ATATATATAT";

/// Check whether a sequence carries a slippage-prone repeat.
///
/// True for a run of eight identical A, T, G or C bases, or five tandem
/// copies of `AT`. No other repeat units are checked.
pub fn is_homopolymer(sequence: &str) -> bool {
    let has_run = ["A", "T", "G", "C"]
        .iter()
        .any(|base| sequence.contains(&base.repeat(HOMOPOLYMER_RUN)));

    has_run || sequence.contains(AT_REPEAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_base_runs() {
        assert!(is_homopolymer("AAAAAAAA"));
        assert!(!is_homopolymer("AAAAAAA"));
        assert!(is_homopolymer("CGTTTTTTTTTCG"));
        assert!(is_homopolymer("ACGGGGGGGGA"));
        assert!(is_homopolymer("CCCCCCCC"));
    }

    #[test]
    fn test_at_repeat() {
        assert!(is_homopolymer("ATATATATAT"));
        assert!(is_homopolymer("GGATATATATATCC"));
        assert!(!is_homopolymer("ATATATATA"));
    }

    #[test]
    fn test_other_repeats_ignored() {
        assert!(!is_homopolymer("GCGCGCGCGC"));
        assert!(!is_homopolymer("TATATATAT"));
        assert!(!is_homopolymer("NNNNNNNNNN"));
        assert!(!is_homopolymer("aaaaaaaa"));
        assert!(!is_homopolymer(""));
    }
}
