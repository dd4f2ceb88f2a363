//! Stacking of per-sample alignment rows into a pseudo multiple alignment.
//!
//! Rows are taken independently from each pairwise alignment. In
//! [`MsaMode::Concatenate`] the columns only line up across samples when
//! every sample induced the same insertion layout; nothing reconciles them.
//! [`MsaMode::ReferenceProjected`] drops insertion columns so every row has
//! the reference length.

use std::collections::BTreeSet;
use std::io::Write;

use crate::alignment::PairwiseAlignment;
use crate::error::Result;
use crate::fasta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MsaMode {
    /// Sample rows exactly as aligned.
    #[default]
    Concatenate,
    /// Sample rows with insertion columns removed.
    ReferenceProjected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsaEntry {
    pub id: String,
    pub row: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PseudoMsa {
    mode: MsaMode,
    entries: Vec<MsaEntry>,
}

impl PseudoMsa {
    pub fn new(mode: MsaMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
        }
    }

    pub fn from_alignments<'a, I>(alignments: I, mode: MsaMode) -> Self
    where
        I: IntoIterator<Item = &'a PairwiseAlignment>,
    {
        let mut msa = Self::new(mode);
        for alignment in alignments {
            msa.push(alignment);
        }
        msa
    }

    /// Append the sample row of `alignment`; the reference row is discarded.
    pub fn push(&mut self, alignment: &PairwiseAlignment) {
        let row = match self.mode {
            MsaMode::Concatenate => alignment.sample_row().to_vec(),
            MsaMode::ReferenceProjected => alignment.sample_projected_on_reference(),
        };
        self.entries.push(MsaEntry {
            id: alignment.accession().to_string(),
            row,
        });
    }

    pub fn entries(&self) -> &[MsaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted set of row lengths; more than one value means the rows are
    /// not column-consistent.
    pub fn distinct_lengths(&self) -> Vec<usize> {
        self.entries
            .iter()
            .map(|e| e.row.len())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_rectangular(&self) -> bool {
        self.distinct_lengths().len() <= 1
    }

    pub fn write_fasta<W: Write>(&self, writer: &mut W) -> Result<()> {
        for entry in &self.entries {
            fasta::write_record(writer, &entry.id, &entry.row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignments() -> Vec<PairwiseAlignment> {
        vec![
            PairwiseAlignment::new("a", "ACGTACGT", "ACG--CGT").unwrap(),
            PairwiseAlignment::new("b", "ACGT--ACGT", "ACGTTTACGT").unwrap(),
            PairwiseAlignment::new("c", "ACGTACGT", "ACGTACGA").unwrap(),
        ]
    }

    #[test]
    fn concatenation_keeps_sample_rows_in_order() {
        let msa = PseudoMsa::from_alignments(&alignments(), MsaMode::Concatenate);
        let ids: Vec<_> = msa.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(msa.entries()[0].row, b"ACG--CGT".to_vec());
        assert_eq!(msa.entries()[1].row, b"ACGTTTACGT".to_vec());
    }

    #[test]
    fn differing_insertion_layouts_are_exposed() {
        let msa = PseudoMsa::from_alignments(&alignments(), MsaMode::Concatenate);
        assert_eq!(msa.distinct_lengths(), vec![8, 10]);
        assert!(!msa.is_rectangular());
    }

    #[test]
    fn projection_is_rectangular() {
        let msa = PseudoMsa::from_alignments(&alignments(), MsaMode::ReferenceProjected);
        assert_eq!(msa.distinct_lengths(), vec![8]);
        assert_eq!(msa.entries()[1].row, b"ACGTACGT".to_vec());
        assert_eq!(msa.entries()[0].row, b"ACG--CGT".to_vec());
    }

    #[test]
    fn empty_msa() {
        let msa = PseudoMsa::from_alignments(&Vec::<PairwiseAlignment>::new(), MsaMode::Concatenate);
        assert!(msa.is_empty());
        assert!(msa.distinct_lengths().is_empty());
        assert!(msa.is_rectangular());
    }

    #[test]
    fn writes_fasta_records() {
        let msa = PseudoMsa::from_alignments(&alignments(), MsaMode::Concatenate);
        let mut out = Vec::new();
        msa.write_fasta(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(">a\nACG--CGT\n>b\n"));
    }
}
