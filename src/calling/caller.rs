use tracing::debug;

use crate::calling::align::{align, AlignmentResult, IndelKind};
use crate::calling::config::CallingConfig;
use crate::calling::homopolymer::is_homopolymer;
use crate::calling::report::{AlleleRecord, AlleleReport, AuxVariant, HaplotypeSite, MISSING_BASE};
use crate::catalog::store::MarkerCatalog;
use crate::core::marker::RefMarker;
use crate::core::read::{Candidate, MarkerGroup};

/// Outcome of the ordered filter chain for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecision {
    /// Kept as an allele; `minor` when its valid ratio is at or below `allele_cover`
    Accepted { minor: bool },
    /// Gross ratio at or below `noise_cut`
    RejectedNoise,
    /// Homopolymer candidate with valid ratio at or below `homopolymer_err`
    RejectedHomopolymer,
    /// Minor allele while minor marking is disabled
    RejectedMinor,
}

/// Apply noise, homopolymer and minor-allele checks, in that order
pub fn classify(
    gross_ratio: f64,
    valid_ratio: f64,
    homopolymer: bool,
    config: &CallingConfig,
) -> CallDecision {
    if gross_ratio <= config.noise_cut {
        return CallDecision::RejectedNoise;
    }
    if homopolymer && valid_ratio <= config.homopolymer_err {
        return CallDecision::RejectedHomopolymer;
    }

    let minor = valid_ratio <= config.allele_cover;
    if minor && !config.mark_minor {
        return CallDecision::RejectedMinor;
    }

    CallDecision::Accepted { minor }
}

/// Share of coverage held by one candidate; `None` when coverage is zero
#[allow(clippy::cast_precision_loss)] // Read counts stay far below 2^53
pub fn ratio(count: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64)
}

/// Sum of read counts of candidates whose gross ratio clears the noise cut
pub fn valid_read_count(candidates: &[Candidate], coverage: u64, noise_cut: f64) -> u64 {
    candidates
        .iter()
        .filter(|c| ratio(c.read_count, coverage).is_some_and(|r| r > noise_cut))
        .map(|c| c.read_count)
        .sum()
}

/// Calls alleles for marker groups against a catalog
pub struct AlleleCaller<'a> {
    catalog: &'a MarkerCatalog,
    config: CallingConfig,
}

impl<'a> AlleleCaller<'a> {
    pub fn new(catalog: &'a MarkerCatalog, config: CallingConfig) -> Self {
        Self { catalog, config }
    }

    /// Call every group in order and concatenate the records
    pub fn call_groups(&self, groups: &[MarkerGroup]) -> Vec<AlleleReport> {
        groups.iter().flat_map(|g| self.call_marker(g)).collect()
    }

    /// Call one marker group.
    ///
    /// Always ends with a [`AlleleReport::Separator`].
    pub fn call_marker(&self, group: &MarkerGroup) -> Vec<AlleleReport> {
        let mut reports = Vec::new();

        let Some(marker) = self.catalog.get(&group.marker_name) else {
            debug!("{}: no reference info", group.marker_name);
            reports.push(AlleleReport::NoReference {
                marker: group.marker_name.clone(),
                coverage: group.coverage,
            });
            reports.push(AlleleReport::Separator);
            return reports;
        };

        let valid_read = valid_read_count(&group.candidates, group.coverage, self.config.noise_cut);
        if valid_read == 0 {
            debug!("{}: no valid read", group.marker_name);
            reports.push(AlleleReport::NoValidRead {
                marker: group.marker_name.clone(),
                coverage: group.coverage,
            });
            reports.push(AlleleReport::Separator);
            return reports;
        }

        let mut allele_index = 0;
        for candidate in &group.candidates {
            // coverage and valid_read are both non-zero here
            let gross_ratio = ratio(candidate.read_count, group.coverage).unwrap_or_default();
            let valid_ratio = ratio(candidate.read_count, valid_read).unwrap_or_default();
            let homopolymer = is_homopolymer(&candidate.sequence);

            let minor = match classify(gross_ratio, valid_ratio, homopolymer, &self.config) {
                CallDecision::Accepted { minor } => minor,
                rejected => {
                    debug!(
                        "{}:{} rejected ({rejected:?}), {} reads",
                        group.marker_name, candidate.allele_id, candidate.read_count
                    );
                    continue;
                }
            };

            allele_index += 1;
            let alignment = align(&marker.ref_seq, &candidate.sequence);
            let sites = haplotype_sites(marker, &alignment);
            let descriptor = if self.config.plain_haplotype {
                sites.iter().map(|s| s.ref_base).collect()
            } else {
                labelled_descriptor(&sites)
            };

            reports.push(AlleleReport::Allele(AlleleRecord {
                marker: group.marker_name.clone(),
                allele_index,
                allele_id: candidate.allele_id.clone(),
                locus: marker.locus_label(),
                sites,
                descriptor,
                aux_variants: aux_variants(marker, &alignment, homopolymer),
                read_count: candidate.read_count,
                valid_ratio,
                gross_ratio,
                homopolymer,
                minor,
            }));
        }

        reports.push(AlleleReport::Separator);
        reports
    }
}

fn base_char(base: Option<u8>) -> char {
    base.map_or(MISSING_BASE, char::from)
}

/// Reference and allele bases at each tracked variant, in variant order
fn haplotype_sites(marker: &RefMarker, alignment: &AlignmentResult) -> Vec<HaplotypeSite> {
    marker
        .variants
        .iter()
        .map(|v| {
            let offset = v.position - marker.seq_start;
            let ref_base = marker.ref_base(offset);
            let allele_base = alignment.aligned_base(offset);
            HaplotypeSite {
                variant_id: v.id.clone(),
                position: v.position,
                ref_base: base_char(ref_base),
                allele_base: base_char(allele_base),
                differs: ref_base != allele_base,
            }
        })
        .collect()
}

/// `id:REF` per site, followed by `"  "` when unchanged or `"> "` when the
/// allele differs
fn labelled_descriptor(sites: &[HaplotypeSite]) -> String {
    let mut descriptor = String::new();
    for site in sites {
        let mark = if site.differs { "> " } else { "  " };
        descriptor.push_str(&format!(" {}:{}{mark}", site.variant_id, site.ref_base));
    }
    descriptor.trim_start().to_string()
}

/// Indel and substitutions that fall outside the tracked variant offsets
fn aux_variants(
    marker: &RefMarker,
    alignment: &AlignmentResult,
    homopolymer: bool,
) -> Vec<AuxVariant> {
    let variant_offsets = marker.variant_offsets();
    let is_variant_offset = |i: usize| {
        i64::try_from(i).is_ok_and(|offset| variant_offsets.contains(&offset))
    };
    let mut aux = Vec::new();

    if let Some(indel) = &alignment.indel {
        if indel.kind == IndelKind::Insertion || !is_variant_offset(indel.offset) {
            aux.push(AuxVariant::Indel {
                position: genomic_position(marker, indel.offset),
                kind: indel.kind,
                sequence: indel.sequence.clone(),
                homopolymer,
            });
        }
    }

    let ref_bytes = marker.ref_seq.as_bytes();
    let aligned_bytes = alignment.aligned_seq.as_bytes();
    for &i in &alignment.mismatch_positions {
        if is_variant_offset(i) {
            continue;
        }
        aux.push(AuxVariant::Substitution {
            position: genomic_position(marker, i),
            ref_base: char::from(ref_bytes[i]),
            alt_base: char::from(aligned_bytes[i]),
        });
    }

    aux
}

#[allow(clippy::cast_possible_wrap)] // Offsets are bounded by the window length
fn genomic_position(marker: &RefMarker, offset: usize) -> i64 {
    marker.seq_start + offset as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFS: &str = "M1xxxxxxxx\tchr1\trs1:104\t100\tACGTACGTAC\n\
                        M2xxxxxxxx\tchr2\trs2:203\trs3:206\t200\tGGCATTGCAAGG\n";

    fn catalog() -> MarkerCatalog {
        MarkerCatalog::from_text(DEFS).unwrap()
    }

    fn group(name: &str, candidates: Vec<Candidate>) -> MarkerGroup {
        MarkerGroup::new(name).with_candidates(candidates)
    }

    fn alleles(reports: &[AlleleReport]) -> Vec<&AlleleRecord> {
        reports
            .iter()
            .filter_map(|r| match r {
                AlleleReport::Allele(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_classify_order() {
        let config = CallingConfig::default();
        assert_eq!(classify(0.05, 0.9, false, &config), CallDecision::RejectedNoise);
        assert_eq!(classify(0.04, 0.1, true, &config), CallDecision::RejectedNoise);
        assert_eq!(
            classify(0.5, 0.15, true, &config),
            CallDecision::RejectedHomopolymer
        );
        assert_eq!(
            classify(0.5, 0.2, true, &config),
            CallDecision::Accepted { minor: true }
        );
        assert_eq!(
            classify(0.5, 0.5, false, &config),
            CallDecision::Accepted { minor: false }
        );

        let no_minor = CallingConfig {
            mark_minor: false,
            ..CallingConfig::default()
        };
        assert_eq!(
            classify(0.2, 0.25, false, &no_minor),
            CallDecision::RejectedMinor
        );
    }

    #[test]
    fn test_ratio_with_zero_total() {
        assert_eq!(ratio(5, 0), None);
        assert_eq!(ratio(5, 10), Some(0.5));
    }

    #[test]
    fn test_valid_read_count() {
        let candidates = vec![
            Candidate::new("10", "A", 500),
            Candidate::new("10", "C", 40),
            Candidate::new("10", "G", 5),
        ];
        assert_eq!(valid_read_count(&candidates, 545, 0.05), 540);
        assert_eq!(valid_read_count(&candidates, 0, 0.05), 0);
    }

    #[test]
    fn test_no_reference() {
        let catalog = catalog();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let reports = caller.call_marker(&group("M9", vec![Candidate::new("1", "ACGT", 300)]));
        assert_eq!(
            reports,
            vec![
                AlleleReport::NoReference {
                    marker: "M9".to_string(),
                    coverage: 300
                },
                AlleleReport::Separator
            ]
        );
    }

    #[test]
    fn test_no_valid_read() {
        let catalog = catalog();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let mut g = MarkerGroup::new("M1xxxxxxxx");
        g.coverage = 10_000;
        g.candidates = vec![Candidate::new("10", "ACGTACGTAC", 100)];

        let reports = caller.call_marker(&g);
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0],
            AlleleReport::NoValidRead {
                marker: "M1xxxxxxxx".to_string(),
                coverage: 10_000
            }
        );
    }

    #[test]
    fn test_substitution_at_variant() {
        let catalog = catalog();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let reports = caller.call_marker(&group(
            "M1xxxxxxxx",
            vec![
                Candidate::new("10", "ACGTACGTAC", 500),
                Candidate::new("10", "ACGTGCGTAC", 400),
            ],
        ));

        let called = alleles(&reports);
        assert_eq!(called.len(), 2);
        assert_eq!(called[0].descriptor, "rs1:A  ");
        assert_eq!(called[0].haplotype_bases(), "A");
        assert_eq!(called[1].descriptor, "rs1:A> ");
        assert_eq!(called[1].haplotype_bases(), "G");
        assert!(called[1].aux_variants.is_empty());
        assert_eq!(called[1].allele_index, 2);
        assert_eq!(called[1].locus, "chr1:104");
        assert!(reports.last().unwrap().is_separator());
    }

    #[test]
    fn test_extra_substitution_and_deletion() {
        let catalog = catalog();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        // Deletion of the first T of "TT" plus a substitution at offset 10
        let reports = caller.call_marker(&group(
            "M2xxxxxxxx",
            vec![Candidate::new("11", "GGCATGCAATG", 500)],
        ));

        let called = alleles(&reports);
        assert_eq!(called.len(), 1);
        assert_eq!(
            called[0].aux_variants,
            vec![
                AuxVariant::Indel {
                    position: 204,
                    kind: IndelKind::Deletion,
                    sequence: "T".to_string(),
                    homopolymer: false,
                },
                AuxVariant::Substitution {
                    position: 210,
                    ref_base: 'G',
                    alt_base: 'T',
                },
            ]
        );
        assert_eq!(called[0].aux_string(), "204-[T] 210G>T");
    }

    #[test]
    fn test_deletion_at_variant_offset_is_not_reported() {
        let catalog = MarkerCatalog::from_text(
            "M3xxxxxxxx\tchr3\trs4:302\t300\tGGCATTGCAAGG\n",
        )
        .unwrap();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let reports =
            caller.call_marker(&group("M3xxxxxxxx", vec![Candidate::new("11", "GGATTGCAAGG", 500)]));

        let called = alleles(&reports);
        assert!(called[0].aux_variants.is_empty());
        assert_eq!(called[0].haplotype_bases(), "-");
        assert_eq!(called[0].descriptor, "rs4:C> ");
    }

    #[test]
    fn test_plain_haplotype() {
        let catalog = catalog();
        let config = CallingConfig {
            plain_haplotype: true,
            ..CallingConfig::default()
        };
        let caller = AlleleCaller::new(&catalog, config);
        let reports =
            caller.call_marker(&group("M2xxxxxxxx", vec![Candidate::new("12", "GGCATTGCAAGG", 500)]));
        assert_eq!(alleles(&reports)[0].descriptor, "AG");
    }

    #[test]
    fn test_out_of_window_variant_renders_missing_base() {
        let catalog =
            MarkerCatalog::from_text("M4xxxxxxxx\tchr4\trs5:402\trs6:450\t400\tACGTACGTAC\n")
                .unwrap();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let reports =
            caller.call_marker(&group("M4xxxxxxxx", vec![Candidate::new("10", "ACGTACGTAC", 500)]));
        let called = alleles(&reports);
        assert_eq!(called[0].haplotype_bases(), "GN");
        assert_eq!(called[0].descriptor, "rs5:G   rs6:N  ");
    }

    #[test]
    fn test_homopolymer_insertion_gets_marker() {
        let catalog =
            MarkerCatalog::from_text("M5xxxxxxxx\tchr5\trs7:500\t500\tGCAAAAAAATGC\n").unwrap();
        let caller = AlleleCaller::new(&catalog, CallingConfig::default());
        let reports = caller.call_marker(&group(
            "M5xxxxxxxx",
            vec![
                Candidate::new("12", "GCAAAAAAATGC", 500),
                Candidate::new("13", "GCAAAAAAAATGC", 300),
            ],
        ));

        let called = alleles(&reports);
        assert_eq!(called.len(), 2);
        assert!(called[1].homopolymer);
        assert_eq!(called[1].aux_string(), "502+[A]@");
    }
}
