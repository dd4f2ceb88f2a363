//! Abstraction over pairwise alignment backends (built-in WFA2, external MAFFT)

use std::path::PathBuf;

use crate::alignment::PairwiseAlignment;
use crate::error::{IndelError, Result};
use crate::fasta::Sequence;

pub mod cached_impl;
pub mod mafft_impl;
pub mod wfa_impl;

pub use cached_impl::CachedAligner;
pub use mafft_impl::MafftAligner;
pub use wfa_impl::{AlignmentScores, WfaAligner};

/// Produces a gapped reference-vs-sample alignment for one sample.
///
/// Implementations are shared across worker threads.
pub trait AlignmentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn align(&self, reference: &Sequence, sample: &Sequence) -> Result<PairwiseAlignment>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AlignerKind {
    /// Built-in end-to-end wavefront alignment
    #[default]
    Wfa,
    /// External MAFFT binary
    Mafft,
}

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub kind: AlignerKind,
    pub scores: AlignmentScores,
    pub mafft_path: PathBuf,
    /// Directory where pairwise alignments are reused from and stored to.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            kind: AlignerKind::Wfa,
            scores: AlignmentScores::default(),
            mafft_path: PathBuf::from("mafft"),
            cache_dir: None,
        }
    }
}

/// Build the configured alignment backend.
pub fn create_aligner(config: &AlignerConfig) -> Box<dyn AlignmentProvider> {
    let backend: Box<dyn AlignmentProvider> = match config.kind {
        AlignerKind::Wfa => Box::new(WfaAligner::new(config.scores.clone())),
        AlignerKind::Mafft => Box::new(MafftAligner::new(config.mafft_path.clone())),
    };

    match &config.cache_dir {
        Some(dir) => Box::new(CachedAligner::new(dir.clone(), backend)),
        None => backend,
    }
}

/// Interpret a two-record aligned FASTA (reference first, sample second).
pub fn alignment_from_records(sample_id: &str, records: Vec<Sequence>) -> Result<PairwiseAlignment> {
    let [reference, sample]: [Sequence; 2] = records.try_into().map_err(|records: Vec<Sequence>| {
        IndelError::alignment_failure(
            sample_id,
            format!("expected 2 aligned records, found {}", records.len()),
        )
    })?;

    PairwiseAlignment::new(
        sample_id,
        reference.data.to_ascii_uppercase(),
        sample.data.to_ascii_uppercase(),
    )
}
