//! Single-indel alignment of a candidate allele against its marker reference.
//!
//! The aligner assumes at most one insertion or deletion separates the two
//! sequences. Every possible placement of that one indel is scored against
//! the full reference window and the best placement wins; all remaining
//! differences are reported as substitutions.
//!
//! Scoring is +1 per matching base and -1 per mismatching base. Gap
//! characters in the candidate score 0. Ties go to the leftmost offset.

use serde::Serialize;

/// Gap character inserted into candidates shorter than the reference
pub const GAP: u8 = b'-';

/// Direction of a length-changing variant, relative to the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndelKind {
    /// The candidate carries extra bases
    Insertion,
    /// The candidate lacks reference bases
    Deletion,
}

impl IndelKind {
    /// Sign used in report tokens
    pub fn sign(self) -> char {
        match self {
            Self::Insertion => '+',
            Self::Deletion => '-',
        }
    }
}

/// The single indel found by [`align`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indel {
    pub kind: IndelKind,

    /// Reference-frame offset where the indel begins
    pub offset: usize,

    /// Inserted candidate bases, or the deleted reference bases
    pub sequence: String,
}

/// Candidate sequence projected onto the reference frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    /// Candidate with the indel normalized away; same length as the reference
    pub aligned_seq: String,

    /// The indel, or `None` when the lengths are equal
    pub indel: Option<Indel>,

    /// Offsets where the aligned candidate differs from the reference and is
    /// not a gap, ascending
    pub mismatch_positions: Vec<usize>,
}

impl AlignmentResult {
    /// Aligned base at a reference-frame offset, if inside the window
    pub fn aligned_base(&self, offset: i64) -> Option<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.aligned_seq.as_bytes().get(i).copied())
    }
}

/// Align a candidate to a reference allowing at most one indel
pub fn align(ref_seq: &str, candidate: &str) -> AlignmentResult {
    let reference = ref_seq.as_bytes();
    let seq = candidate.as_bytes();

    let (aligned, indel) = match reference.len().cmp(&seq.len()) {
        std::cmp::Ordering::Equal => (seq.to_vec(), None),
        std::cmp::Ordering::Greater => {
            let gap_len = reference.len() - seq.len();
            let offset = best_offset(reference, seq.len(), |i, j| {
                deletion_trial_base(seq, i, gap_len, j)
            });

            let mut aligned = Vec::with_capacity(reference.len());
            aligned.extend_from_slice(&seq[..offset]);
            aligned.resize(offset + gap_len, GAP);
            aligned.extend_from_slice(&seq[offset..]);

            let indel = Indel {
                kind: IndelKind::Deletion,
                offset,
                sequence: String::from_utf8_lossy(&reference[offset..offset + gap_len])
                    .into_owned(),
            };
            (aligned, Some(indel))
        }
        std::cmp::Ordering::Less => {
            let extra = seq.len() - reference.len();
            let offset = best_offset(reference, seq.len() - extra, |i, j| {
                insertion_trial_base(seq, i, extra, j)
            });

            let mut aligned = Vec::with_capacity(reference.len());
            aligned.extend_from_slice(&seq[..offset]);
            aligned.extend_from_slice(&seq[offset + extra..]);

            let indel = Indel {
                kind: IndelKind::Insertion,
                offset,
                sequence: String::from_utf8_lossy(&seq[offset..offset + extra]).into_owned(),
            };
            (aligned, Some(indel))
        }
    };

    let mismatch_positions = reference
        .iter()
        .zip(&aligned)
        .enumerate()
        .filter(|(_, (r, a))| r != a && **a != GAP)
        .map(|(i, _)| i)
        .collect();

    AlignmentResult {
        aligned_seq: String::from_utf8_lossy(&aligned).into_owned(),
        indel,
        mismatch_positions,
    }
}

/// Scan offsets `0..=last_offset` and return the leftmost best-scoring one.
///
/// `trial_base(i, j)` yields the trial sequence's base at reference position
/// `j` when the indel is placed at offset `i`.
fn best_offset<F>(reference: &[u8], last_offset: usize, trial_base: F) -> usize
where
    F: Fn(usize, usize) -> u8,
{
    let mut best = 0;
    let mut best_score = i64::MIN;

    for i in 0..=last_offset {
        let score: i64 = reference
            .iter()
            .enumerate()
            .map(|(j, &r)| {
                let t = trial_base(i, j);
                if t == r {
                    1
                } else if t == GAP {
                    0
                } else {
                    -1
                }
            })
            .sum();

        if score > best_score {
            best_score = score;
            best = i;
        }
    }

    best
}

/// Base at `j` of the candidate with `gap_len` gaps inserted at `offset`
fn deletion_trial_base(seq: &[u8], offset: usize, gap_len: usize, j: usize) -> u8 {
    if j < offset {
        seq[j]
    } else if j < offset + gap_len {
        GAP
    } else {
        seq[j - gap_len]
    }
}

/// Base at `j` of the candidate with `extra` bases removed at `offset`
fn insertion_trial_base(seq: &[u8], offset: usize, extra: usize, j: usize) -> u8 {
    if j < offset {
        seq[j]
    } else {
        seq[j + extra]
    }
}
