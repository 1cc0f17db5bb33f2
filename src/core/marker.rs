use serde::{Deserialize, Serialize};

/// A tracked variant position inside a marker window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier (usually an rs number)
    pub id: String,

    /// Genomic coordinate of the variant
    pub position: i64,
}

impl Variant {
    pub fn new(id: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// A microhaplotype marker from the reference definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefMarker {
    /// Marker name, unique within a catalog
    pub name: String,

    /// Chromosome label (free text, e.g. "chr1")
    pub chromosome: String,

    /// Variants in file order
    #[serde(default)]
    pub variants: Vec<Variant>,

    /// Genomic coordinate of the first base of `ref_seq`
    pub seq_start: i64,

    /// Uppercased reference sequence for the marker window
    pub ref_seq: String,
}

impl RefMarker {
    pub fn new(
        name: impl Into<String>,
        chromosome: impl Into<String>,
        seq_start: i64,
        ref_seq: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chromosome: chromosome.into(),
            variants: Vec::new(),
            seq_start,
            ref_seq: ref_seq.into().to_uppercase(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }

    /// Length of the reference window
    pub fn window_len(&self) -> usize {
        self.ref_seq.len()
    }

    /// One past the last genomic coordinate covered by the window
    #[allow(clippy::cast_possible_wrap)] // Sequence lengths are far below i64::MAX
    pub fn window_end(&self) -> i64 {
        self.seq_start + self.ref_seq.len() as i64
    }

    /// Check whether a genomic coordinate falls inside `[seq_start, seq_start + len)`
    pub fn contains(&self, position: i64) -> bool {
        position >= self.seq_start && position < self.window_end()
    }

    /// Reference-frame offsets of the variants, in variant order.
    ///
    /// Offsets are signed: a variant declared outside the window keeps its
    /// out-of-range offset so callers can see it.
    pub fn variant_offsets(&self) -> Vec<i64> {
        self.variants
            .iter()
            .map(|v| v.position - self.seq_start)
            .collect()
    }

    /// Locus label used in reports: `chromosome:first_variant_position`
    pub fn locus_label(&self) -> String {
        match self.variants.first() {
            Some(first) => format!("{}:{}", self.chromosome, first.position),
            None => self.chromosome.clone(),
        }
    }

    /// Reference base at a reference-frame offset, if it lies inside the window
    pub fn ref_base(&self, offset: i64) -> Option<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.ref_seq.as_bytes().get(i).copied())
    }
}
