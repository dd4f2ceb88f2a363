use serde::Serialize;

use crate::alignment::PairwiseAlignment;
use crate::context::{flanks, DEFAULT_CONTEXT_WIDTH};
use crate::coordinates::{place_insertions, ReferenceCoordinates};
use crate::gap_runs::{deletion_runs, insertion_runs, GapRun, IndelKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Flanking bases reported on each side of an event.
    pub context_width: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            context_width: DEFAULT_CONTEXT_WIDTH,
        }
    }
}

/// One insertion or deletion event, serialized as a row of the indel table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndelRecord {
    pub accession_id: String,
    #[serde(skip)]
    pub kind: IndelKind,
    /// Inserted or deleted bases, prefixed with `+` or `-`.
    #[serde(rename = "indel")]
    pub affected_bases: String,
    /// Start in ungapped reference coordinates.
    #[serde(rename = "ref_start_pos")]
    pub reference_position: usize,
    /// Start column in the pairwise alignment.
    #[serde(rename = "seq_start_pos")]
    pub alignment_column: usize,
    pub length: usize,
    #[serde(rename = "upstream_ref")]
    pub upstream_context: String,
    #[serde(rename = "downstream_ref")]
    pub downstream_context: String,
}

/// Events found in one sample's alignment, each list in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIndels {
    pub accession_id: String,
    pub insertions: Vec<IndelRecord>,
    pub deletions: Vec<IndelRecord>,
}

impl SampleIndels {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.insertions.len() + self.deletions.len()
    }
}

fn signed_bases(kind: IndelKind, bases: &[u8]) -> String {
    let mut out = String::with_capacity(bases.len() + 1);
    out.push(kind.sign());
    out.push_str(&String::from_utf8_lossy(bases));
    out
}

/// Catalog every indel of one alignment.
///
/// Insertions are placed on the ungapped `reference` and take their flanks
/// from it. Deletions take their deleted bases and flanks from the aligned
/// reference row; a deletion starting at column 0 is treated as an
/// alignment boundary artifact and skipped.
pub fn scan_alignment(
    alignment: &PairwiseAlignment,
    reference: &[u8],
    config: &ScanConfig,
) -> SampleIndels {
    let accession = alignment.accession();
    let placed = place_insertions(&insertion_runs(alignment));
    let coordinates = ReferenceCoordinates::from_insertions(&placed);

    let insertions = placed
        .iter()
        .map(|p| {
            let GapRun { start, end, .. } = p.run;
            let context = flanks(reference, p.reference_position, config.context_width);
            IndelRecord {
                accession_id: accession.to_string(),
                kind: IndelKind::Insertion,
                affected_bases: signed_bases(IndelKind::Insertion, &alignment.sample_row()[start..end]),
                reference_position: p.reference_position,
                alignment_column: start,
                length: p.run.len(),
                upstream_context: context.upstream,
                downstream_context: context.downstream,
            }
        })
        .collect();

    let reference_row = alignment.reference_row();
    let deletions = deletion_runs(alignment)
        .into_iter()
        .filter(|run| run.start != 0)
        .map(|run| {
            let context = flanks(reference_row, run.start, config.context_width);
            IndelRecord {
                accession_id: accession.to_string(),
                kind: IndelKind::Deletion,
                affected_bases: signed_bases(IndelKind::Deletion, &reference_row[run.start..run.end]),
                reference_position: coordinates.to_reference(run.start),
                alignment_column: run.start,
                length: run.len(),
                upstream_context: context.upstream,
                downstream_context: context.downstream,
            }
        })
        .collect();

    SampleIndels {
        accession_id: accession.to_string(),
        insertions,
        deletions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(reference: &str, ref_row: &str, sample_row: &str) -> SampleIndels {
        let aln = PairwiseAlignment::new("sample", ref_row, sample_row).unwrap();
        scan_alignment(&aln, reference.as_bytes(), &ScanConfig::default())
    }

    /// Rebuild a sample from the reference by applying its indel events.
    fn apply_indels(reference: &[u8], indels: &SampleIndels) -> Vec<u8> {
        let mut out = Vec::new();
        for pos in 0..=reference.len() {
            for ins in indels.insertions.iter().filter(|r| r.reference_position == pos) {
                out.extend(ins.affected_bases[1..].bytes());
            }
            let deleted = indels.deletions.iter().any(|d| {
                pos >= d.reference_position && pos < d.reference_position + d.length
            });
            if pos < reference.len() && !deleted {
                out.push(reference[pos]);
            }
        }
        out
    }

    #[test]
    fn no_gaps_no_records() {
        let indels = scan("ACGTACGT", "ACGTACGT", "ACGAACGT");
        assert!(indels.is_empty());
        assert_eq!(indels.accession_id, "sample");
    }

    #[test]
    fn single_insertion() {
        let indels = scan("ACGTGTACGT", "ACGT--GTACGT", "ACGTTTGTACGT");
        assert!(indels.deletions.is_empty());
        assert_eq!(indels.insertions.len(), 1);
        let ins = &indels.insertions[0];
        assert_eq!(ins.kind, IndelKind::Insertion);
        assert_eq!(ins.reference_position, 4);
        assert_eq!(ins.alignment_column, 4);
        assert_eq!(ins.affected_bases, "+TT");
        assert_eq!(ins.length, 2);
        assert_eq!(ins.upstream_context, "ACGT");
        assert_eq!(ins.downstream_context, "GTACGT");
    }

    #[test]
    fn single_deletion() {
        let indels = scan("ACGTACGT", "ACGTACGT", "ACG--CGT");
        assert!(indels.insertions.is_empty());
        assert_eq!(indels.deletions.len(), 1);
        let del = &indels.deletions[0];
        assert_eq!(del.kind, IndelKind::Deletion);
        assert_eq!(del.alignment_column, 3);
        assert_eq!(del.reference_position, 3);
        assert_eq!(del.affected_bases, "-TA");
        assert_eq!(del.length, 2);
        assert_eq!(del.upstream_context, "ACG");
        assert_eq!(del.downstream_context, "TACGT");
    }

    #[test]
    fn leading_deletion_is_skipped() {
        let indels = scan("ACGTACGT", "ACGTACGT", "--GTA-GT");
        assert_eq!(indels.deletions.len(), 1);
        assert_eq!(indels.deletions[0].alignment_column, 5);
        assert_eq!(indels.deletions[0].affected_bases, "-C");
    }

    #[test]
    fn leading_insertion_is_kept() {
        let indels = scan("ACGT", "--ACGT", "GGACGT");
        assert_eq!(indels.insertions.len(), 1);
        assert_eq!(indels.insertions[0].reference_position, 0);
        assert_eq!(indels.insertions[0].upstream_context, "");
        assert_eq!(indels.insertions[0].downstream_context, "ACGT");
    }

    #[test]
    fn second_insertion_reports_reference_coordinates() {
        // insertions at columns 5 (len 2) and 20 (len 3)
        let reference = "AAAAACCCCCCCCCCCGGGGGGGGG";
        let ref_row = "AAAAA--CCCCCCCCCCCGG---GGGGGGG";
        let sample_row = "AAAAATTCCCCCCCCCCCGGTTTGGGGGGG";
        let indels = scan(reference, ref_row, sample_row);
        let positions: Vec<_> = indels.insertions.iter().map(|r| r.reference_position).collect();
        let columns: Vec<_> = indels.insertions.iter().map(|r| r.alignment_column).collect();
        assert_eq!(columns, vec![5, 20]);
        assert_eq!(positions, vec![5, 18]);
        assert_eq!(indels.insertions[1].upstream_context, "CCCCCGG");
        assert_eq!(indels.insertions[1].downstream_context, "GGGGGGG");
    }

    #[test]
    fn insertion_near_start_has_short_upstream() {
        let indels = scan("ACGTTTTG", "ACG--TTTTG", "ACGCCTTTTG");
        let ins = &indels.insertions[0];
        assert_eq!(ins.reference_position, 3);
        assert_eq!(ins.upstream_context, "ACG");
    }

    #[test]
    fn deletion_after_insertion_is_shifted_into_reference_space() {
        let indels = scan("ACGTACGTAC", "AC--GTACGTAC", "ACTTGTA--TAC");
        assert_eq!(indels.insertions.len(), 1);
        let del = &indels.deletions[0];
        assert_eq!(del.alignment_column, 7);
        assert_eq!(del.reference_position, 5);
        assert_eq!(del.affected_bases, "-CG");
        // flanks come from the aligned reference row
        assert_eq!(del.upstream_context, "AC--GTA");
    }

    #[test]
    fn custom_context_width() {
        let aln = PairwiseAlignment::new("s", "ACGTACGT", "ACGT--GT").unwrap();
        let indels = scan_alignment(&aln, b"ACGTACGT", &ScanConfig { context_width: 2 });
        assert_eq!(indels.deletions[0].upstream_context, "GT");
        assert_eq!(indels.deletions[0].downstream_context, "AC");
    }

    #[test]
    fn applying_indels_restores_sample() {
        let cases = [
            ("ACGTACGTAC", "AC--GTACGTAC", "ACTTGTA--TAC"),
            ("ACGTACGT", "ACGT--ACGT", "ACGTGGAC-T"),
            ("ACGTACGTAAA", "ACGTACGTAAA---", "AC---CGTAAAGGG"),
        ];
        for (reference, ref_row, sample_row) in cases {
            let indels = scan(reference, ref_row, sample_row);
            let sample: Vec<u8> = sample_row.bytes().filter(|&b| b != b'-').collect();
            assert_eq!(apply_indels(reference.as_bytes(), &indels), sample, "{sample_row}");
        }
    }
}
