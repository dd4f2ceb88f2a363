//! Translation from alignment columns to ungapped reference coordinates.
//!
//! Columns where the reference row holds a gap (insertions) have no position
//! of their own in the reference numbering, so every column after an
//! insertion run is shifted left by the run's length. Insertion runs are
//! folded in increasing column order, carrying the total length of the runs
//! already seen.

use crate::gap_runs::GapRun;

/// An insertion run annotated with its reference-relative start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRun {
    pub run: GapRun,
    pub reference_position: usize,
}

/// Annotate insertion runs with their reference positions.
///
/// The runs are ordered by column first; the k-th run lands at
/// `start_k - sum(len_1..len_{k-1})`.
pub fn place_insertions(runs: &[GapRun]) -> Vec<PlacedRun> {
    let mut ordered = runs.to_vec();
    ordered.sort_by_key(|run| run.start);

    ordered
        .into_iter()
        .scan(0usize, |moving_length, run| {
            let placed = PlacedRun {
                run,
                reference_position: run.start - *moving_length,
            };
            *moving_length += run.len();
            Some(placed)
        })
        .collect()
}

/// Column to reference-position lookup for one alignment.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCoordinates {
    /// (end column of an insertion run, inserted columns up to that end)
    shifts: Vec<(usize, usize)>,
}

impl ReferenceCoordinates {
    pub fn from_insertions(placed: &[PlacedRun]) -> Self {
        let shifts = placed
            .iter()
            .scan(0usize, |total, p| {
                *total += p.run.len();
                Some((p.run.end, *total))
            })
            .collect();
        Self { shifts }
    }

    /// Reference position of an alignment column that is not itself inside
    /// an insertion run.
    pub fn to_reference(&self, column: usize) -> usize {
        let passed = self.shifts.partition_point(|&(end, _)| end <= column);
        let inserted = if passed == 0 { 0 } else { self.shifts[passed - 1].1 };
        column - inserted
    }

    /// Total number of inserted columns in the alignment.
    pub fn inserted_columns(&self) -> usize {
        self.shifts.last().map(|&(_, total)| total).unwrap_or(0)
    }
}
