//! Detection of maximal gap runs in the rows of a pairwise alignment

use crate::alignment::{PairwiseAlignment, GAP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Gap in the reference row: the sample carries extra bases
    Reference,
    /// Gap in the sample row: the sample lacks reference bases
    Sample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndelKind {
    Insertion,
    Deletion,
}

impl Track {
    pub fn indel_kind(self) -> IndelKind {
        match self {
            Track::Reference => IndelKind::Insertion,
            Track::Sample => IndelKind::Deletion,
        }
    }
}

impl IndelKind {
    /// Prefix used for the affected bases in the indel table.
    pub fn sign(self) -> char {
        match self {
            IndelKind::Insertion => '+',
            IndelKind::Deletion => '-',
        }
    }
}

/// Maximal run of gap columns `[start, end)` in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapRun {
    pub track: Track,
    pub start: usize,
    pub end: usize,
}

impl GapRun {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn kind(&self) -> IndelKind {
        self.track.indel_kind()
    }
}

/// Find every maximal gap run in `row`, in column order.
pub fn find_gap_runs(row: &[u8], track: Track) -> Vec<GapRun> {
    let mut runs = Vec::new();
    let mut run_start = None;

    for (column, &symbol) in row.iter().enumerate() {
        match (symbol == GAP, run_start) {
            (true, None) => run_start = Some(column),
            (false, Some(start)) => {
                runs.push(GapRun {
                    track,
                    start,
                    end: column,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push(GapRun {
            track,
            start,
            end: row.len(),
        });
    }

    runs
}

/// Gap runs in the reference row (insertions).
pub fn insertion_runs(alignment: &PairwiseAlignment) -> Vec<GapRun> {
    find_gap_runs(alignment.reference_row(), Track::Reference)
}

/// Gap runs in the sample row (deletions).
pub fn deletion_runs(alignment: &PairwiseAlignment) -> Vec<GapRun> {
    find_gap_runs(alignment.sample_row(), Track::Sample)
}
