//! Built-in end-to-end WFA2 aligner

use lib_wfa2::affine_wavefront::{
    AffineWavefronts, AlignmentScope, AlignmentSpan, AlignmentStatus, HeuristicStrategy,
    MemoryMode,
};

use super::AlignmentProvider;
use crate::alignment::{PairwiseAlignment, GAP};
use crate::error::{IndelError, Result};
use crate::fasta::Sequence;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentScores {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap1_open: i32,
    pub gap1_extend: i32,
    pub gap2_open: Option<i32>,
    pub gap2_extend: Option<i32>,
}

impl Default for AlignmentScores {
    fn default() -> Self {
        Self {
            match_score: 0,
            mismatch_penalty: 5,
            gap1_open: 8,
            gap1_extend: 2,
            gap2_open: Some(24),
            gap2_extend: Some(1),
        }
    }
}

impl AlignmentScores {
    /// Parse `match,mismatch,gap1_open,gap1_extend[,gap2_open,gap2_extend]`.
    pub fn parse(scores_str: &str) -> Result<Self> {
        let parts: Vec<&str> = scores_str.split(',').map(str::trim).collect();

        if parts.len() != 4 && parts.len() != 6 {
            return Err(IndelError::InvalidScores(format!(
                "expected 4 or 6 values (match,mismatch,gap1_open,gap1_extend[,gap2_open,gap2_extend]), got {}",
                parts.len()
            )));
        }

        let value = |idx: usize, name: &str| -> Result<i32> {
            parts[idx]
                .parse::<i32>()
                .map_err(|_| IndelError::InvalidScores(format!("invalid {}: {}", name, parts[idx])))
        };

        let (gap2_open, gap2_extend) = if parts.len() == 6 {
            (Some(value(4, "gap2_open")?), Some(value(5, "gap2_extend")?))
        } else {
            (None, None)
        };

        Ok(AlignmentScores {
            match_score: value(0, "match score")?,
            mismatch_penalty: value(1, "mismatch penalty")?,
            gap1_open: value(2, "gap1_open")?,
            gap1_extend: value(3, "gap1_extend")?,
            gap2_open,
            gap2_extend,
        })
    }
}

/// Configure WFA2 for global end-to-end alignment with CIGAR output.
fn build_wavefronts(scores: &AlignmentScores) -> AffineWavefronts {
    let mut wf = if let (Some(gap2_open), Some(gap2_extend)) = (scores.gap2_open, scores.gap2_extend) {
        AffineWavefronts::with_penalties_affine2p_and_memory_mode(
            scores.match_score,
            scores.mismatch_penalty,
            scores.gap1_open,
            scores.gap1_extend,
            gap2_open,
            gap2_extend,
            MemoryMode::Ultralow,
        )
    } else {
        AffineWavefronts::with_penalties_and_memory_mode(
            scores.match_score,
            scores.mismatch_penalty,
            scores.gap1_open,
            scores.gap1_extend,
            MemoryMode::Ultralow,
        )
    };

    wf.set_alignment_scope(AlignmentScope::Alignment);
    wf.set_alignment_span(AlignmentSpan::End2End);
    wf.set_heuristic(&HeuristicStrategy::None);

    wf
}

/// Expand a WFA2 CIGAR for `align(reference, sample)` into two gapped rows.
///
/// Accepts both per-column operation bytes (`MMMIX`) and run-length form
/// (`3M1I1X`). `I` consumes the sample only, `D` the reference only.
/// Returns `None` if the operations do not consume both inputs exactly.
pub fn expand_cigar(cigar: &[u8], reference: &[u8], sample: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut ref_row = Vec::with_capacity(reference.len());
    let mut sample_row = Vec::with_capacity(sample.len());
    let (mut r, mut s) = (0usize, 0usize);
    let mut count = 0usize;

    for &op in cigar {
        if op.is_ascii_digit() {
            count = count * 10 + (op - b'0') as usize;
            continue;
        }
        let n = if count == 0 { 1 } else { count };
        count = 0;

        let (take_ref, take_sample) = match op {
            b'M' | b'=' | b'X' => (true, true),
            b'I' => (false, true),
            b'D' => (true, false),
            _ => return None,
        };
        if (take_ref && r + n > reference.len()) || (take_sample && s + n > sample.len()) {
            return None;
        }

        for _ in 0..n {
            if take_ref {
                ref_row.push(reference[r]);
                r += 1;
            } else {
                ref_row.push(GAP);
            }
            if take_sample {
                sample_row.push(sample[s]);
                s += 1;
            } else {
                sample_row.push(GAP);
            }
        }
    }

    if r == reference.len() && s == sample.len() {
        Some((ref_row, sample_row))
    } else {
        None
    }
}

pub struct WfaAligner {
    scores: AlignmentScores,
}

impl WfaAligner {
    pub fn new(scores: AlignmentScores) -> Self {
        Self { scores }
    }
}

impl AlignmentProvider for WfaAligner {
    fn name(&self) -> &str {
        "wfa"
    }

    fn align(&self, reference: &Sequence, sample: &Sequence) -> Result<PairwiseAlignment> {
        let reference_data = reference.data.to_ascii_uppercase();
        let sample_data = sample.data.to_ascii_uppercase();

        let mut wf = build_wavefronts(&self.scores);
        let status = wf.align(&reference_data, &sample_data);
        if !matches!(status, AlignmentStatus::Completed) {
            return Err(IndelError::alignment_failure(
                &sample.id,
                "wavefront alignment did not complete",
            ));
        }

        let (ref_row, sample_row) = expand_cigar(wf.cigar(), &reference_data, &sample_data)
            .ok_or_else(|| {
                IndelError::alignment_failure(
                    &sample.id,
                    format!(
                        "CIGAR does not span reference ({} bp) and sample ({} bp)",
                        reference_data.len(),
                        sample_data.len()
                    ),
                )
            })?;
        log::debug!(
            "[wfa] {} aligned over {} columns (score {})",
            sample.id,
            ref_row.len(),
            wf.score()
        );

        PairwiseAlignment::new(sample.id.as_str(), ref_row, sample_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scores() {
        let scores = AlignmentScores::parse("0,5,8,2,24,1").unwrap();
        assert_eq!(scores, AlignmentScores::default());

        let scores = AlignmentScores::parse("0, 1, 1, 1").unwrap();
        assert_eq!(scores.mismatch_penalty, 1);
        assert!(scores.gap2_open.is_none());
        assert!(scores.gap2_extend.is_none());
    }

    #[test]
    fn test_parse_scores_rejects_bad_input() {
        assert!(matches!(
            AlignmentScores::parse("0,5,8"),
            Err(IndelError::InvalidScores(_))
        ));
        assert!(matches!(
            AlignmentScores::parse("0,5,8,2,24"),
            Err(IndelError::InvalidScores(_))
        ));
        assert!(matches!(
            AlignmentScores::parse("0,x,8,2"),
            Err(IndelError::InvalidScores(_))
        ));
    }

    #[test]
    fn test_expand_per_column_ops() {
        let (r, s) = expand_cigar(b"MMMMIIMM", b"ACGTGT", b"ACGTTTGT").unwrap();
        assert_eq!(r, b"ACGT--GT".to_vec());
        assert_eq!(s, b"ACGTTTGT".to_vec());
    }

    #[test]
    fn test_expand_run_length_ops() {
        let (r, s) = expand_cigar(b"3M2D3M", b"ACGTACGT", b"ACGCGT").unwrap();
        assert_eq!(r, b"ACGTACGT".to_vec());
        assert_eq!(s, b"ACG--CGT".to_vec());

        let (r, s) = expand_cigar(b"2=1X1=", b"ACGT", b"ACTT").unwrap();
        assert_eq!(r, b"ACGT".to_vec());
        assert_eq!(s, b"ACTT".to_vec());
    }

    #[test]
    fn test_expand_rejects_incomplete_cigar() {
        assert!(expand_cigar(b"3M", b"ACGT", b"ACGT").is_none());
        assert!(expand_cigar(b"5M", b"ACGT", b"ACGT").is_none());
        assert!(expand_cigar(b"4S", b"ACGT", b"ACGT").is_none());
    }

    #[test]
    fn test_wfa_insertion_roundtrip() {
        let aligner = WfaAligner::new(AlignmentScores::default());
        let reference = Sequence::new("ref", "ACGTACGTACGTAAACCCGGGTTTACGTACGT");
        let sample = Sequence::new("s1", "ACGTACGTACGTAAACCCTTTGGGTTTACGTACGT");
        let aln = aligner.align(&reference, &sample).unwrap();
        assert_eq!(aln.ungapped_reference(), reference.data);
        assert_eq!(aln.ungapped_sample(), sample.data);
        assert_eq!(aln.len(), sample.len());
    }

    #[test]
    fn test_wfa_deletion_roundtrip() {
        let aligner = WfaAligner::new(AlignmentScores::default());
        let reference = Sequence::new("ref", "ACGTACGTACGTAAACCCTTTGGGTTTACGTACGT");
        let sample = Sequence::new("s1", "ACGTACGTACGTAAACCCGGGTTTACGTACGT");
        let aln = aligner.align(&reference, &sample).unwrap();
        assert_eq!(aln.ungapped_reference(), reference.data);
        assert_eq!(aln.ungapped_sample(), sample.data);
        assert_eq!(aln.len(), reference.len());
        assert!(!aln.reference_row().contains(&GAP));
        assert_eq!(aln.sample_row().iter().filter(|&&b| b == GAP).count(), 3);
    }

    #[test]
    fn test_wfa_identical_has_no_gaps() {
        let aligner = WfaAligner::new(AlignmentScores::default());
        let reference = Sequence::new("ref", "ACGTACGTACGT");
        let aln = aligner.align(&reference, &Sequence::new("s1", "acgtacgtacgt")).unwrap();
        assert_eq!(aln.reference_row(), b"ACGTACGTACGT");
        assert_eq!(aln.sample_row(), b"ACGTACGTACGT");
    }
}
