//! Two-row gapped alignment of one sample against the reference.

use crate::error::{IndelError, Result};

/// Padding symbol inserted by the aligner.
pub const GAP: u8 = b'-';

/// A reference-vs-sample alignment whose rows are guaranteed to have equal
/// length and no column that is a gap in both rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseAlignment {
    accession: String,
    reference_row: Vec<u8>,
    sample_row: Vec<u8>,
}

impl PairwiseAlignment {
    pub fn new(
        accession: impl Into<String>,
        reference_row: impl Into<Vec<u8>>,
        sample_row: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let accession = accession.into();
        let reference_row = reference_row.into();
        let sample_row = sample_row.into();

        if reference_row.len() != sample_row.len() {
            return Err(IndelError::malformed(
                &accession,
                format!(
                    "reference row has {} columns but sample row has {}",
                    reference_row.len(),
                    sample_row.len()
                ),
            ));
        }
        if let Some(column) = reference_row
            .iter()
            .zip(&sample_row)
            .position(|(&r, &s)| r == GAP && s == GAP)
        {
            return Err(IndelError::malformed(
                &accession,
                format!("gap in both rows at column {}", column),
            ));
        }

        Ok(Self {
            accession,
            reference_row,
            sample_row,
        })
    }

    pub fn accession(&self) -> &str {
        &self.accession
    }

    pub fn reference_row(&self) -> &[u8] {
        &self.reference_row
    }

    pub fn sample_row(&self) -> &[u8] {
        &self.sample_row
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.reference_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference_row.is_empty()
    }

    pub fn ungapped_reference(&self) -> Vec<u8> {
        strip_gaps(&self.reference_row)
    }

    pub fn ungapped_sample(&self) -> Vec<u8> {
        strip_gaps(&self.sample_row)
    }

    /// Sample row without the columns where the reference has a gap.
    ///
    /// The result has exactly the ungapped reference length.
    pub fn sample_projected_on_reference(&self) -> Vec<u8> {
        self.reference_row
            .iter()
            .zip(&self.sample_row)
            .filter(|&(&r, _)| r != GAP)
            .map(|(_, &s)| s)
            .collect()
    }
}

pub fn strip_gaps(row: &[u8]) -> Vec<u8> {
    row.iter().copied().filter(|&b| b != GAP).collect()
}
