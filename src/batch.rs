//! Batch driver: duplicate filtering, per-sample alignment and scanning on a
//! worker pool, and the ordered fan-in into the catalog and pseudo-MSA.
//!
//! Per-sample errors never abort the batch; they are collected in the
//! [`BatchReport`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::aligner::AlignmentProvider;
use crate::alignment::PairwiseAlignment;
use crate::catalog::IndelCatalog;
use crate::error::{IndelError, Result};
use crate::fasta::Sequence;
use crate::msa::{MsaMode, PseudoMsa};
use crate::scanner::{scan_alignment, SampleIndels, ScanConfig};

/// Progress is logged for the first sample, every this many, and the last.
const PROGRESS_INTERVAL: usize = 25;

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    pub scan: ScanConfig,
    pub msa_mode: MsaMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AlignmentFailure,
    MalformedAlignment,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFailure {
    pub accession_id: String,
    pub kind: FailureKind,
    pub message: String,
}

impl SampleFailure {
    fn from_error(accession_id: &str, error: &IndelError) -> Self {
        let kind = match error {
            IndelError::AlignmentFailure { .. } => FailureKind::AlignmentFailure,
            IndelError::MalformedAlignment { .. } => FailureKind::MalformedAlignment,
            _ => FailureKind::Other,
        };
        Self {
            accession_id: accession_id.to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

/// An identifier seen more than once; only its first record was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSample {
    pub accession_id: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub reference_id: String,
    pub aligner: String,
    pub samples_total: usize,
    /// Samples left after dropping duplicate identifiers.
    pub samples_unique: usize,
    pub samples_processed: usize,
    pub duplicates: Vec<DuplicateSample>,
    pub failures: Vec<SampleFailure>,
    pub insertions: usize,
    pub deletions: usize,
    /// Distinct pseudo-MSA row lengths.
    pub msa_lengths: Vec<usize>,
}

impl BatchReport {
    pub fn is_empty_batch(&self) -> bool {
        self.samples_total == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub catalog: IndelCatalog,
    pub msa: PseudoMsa,
    pub report: BatchReport,
}

/// Keep the first record for every identifier, in input order.
pub fn deduplicate(samples: Vec<Sequence>) -> (Vec<Sequence>, Vec<DuplicateSample>) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicate_order = Vec::new();
    let mut unique = Vec::with_capacity(samples.len());

    for sample in samples {
        let count = seen.entry(sample.id.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            unique.push(sample);
        } else if *count == 2 {
            duplicate_order.push(sample.id);
        }
    }

    let duplicates = duplicate_order
        .into_iter()
        .map(|id| DuplicateSample {
            occurrences: seen[&id],
            accession_id: id,
        })
        .collect();
    (unique, duplicates)
}

/// Align one sample and catalog its indels.
pub fn align_and_scan(
    reference: &Sequence,
    sample: &Sequence,
    aligner: &dyn AlignmentProvider,
    config: &ScanConfig,
) -> Result<(PairwiseAlignment, SampleIndels)> {
    let alignment = aligner.align(reference, sample)?;
    let indels = scan_alignment(&alignment, &reference.data, config);
    log::debug!(
        "{}: {} insertion(s), {} deletion(s)",
        sample.id,
        indels.insertions.len(),
        indels.deletions.len()
    );
    Ok((alignment, indels))
}

/// Run the whole batch against `reference`.
pub fn process_batch(
    reference: &Sequence,
    samples: Vec<Sequence>,
    aligner: &dyn AlignmentProvider,
    options: &BatchOptions,
) -> BatchOutput {
    let samples_total = samples.len();
    let (samples, duplicates) = deduplicate(samples);

    log::info!("there are {} sequences", samples_total);
    log::info!(
        "there are {} records with the same identifier; only the first of each is processed",
        duplicates.len()
    );
    for dup in &duplicates {
        log::warn!(
            "duplicate identifier {} seen {} times; later records dropped",
            dup.accession_id,
            dup.occurrences
        );
    }

    let mut report = BatchReport {
        reference_id: reference.id.clone(),
        aligner: aligner.name().to_string(),
        samples_total,
        samples_unique: samples.len(),
        duplicates,
        ..BatchReport::default()
    };

    if samples.is_empty() {
        log::warn!("empty batch: no samples to process");
        return BatchOutput {
            msa: PseudoMsa::new(options.msa_mode),
            report,
            ..BatchOutput::default()
        };
    }

    // Reference bases are compared against uppercased aligner rows.
    let reference = Sequence::new(reference.id.clone(), reference.data.to_ascii_uppercase());
    let outcomes = run_on_pool(options.threads, || {
        scan_all(&reference, &samples, aligner, &options.scan)
    });

    let mut scanned = Vec::with_capacity(outcomes.len());
    let mut msa = PseudoMsa::new(options.msa_mode);
    for (sample, outcome) in samples.iter().zip(outcomes) {
        match outcome {
            Ok((alignment, indels)) => {
                msa.push(&alignment);
                scanned.push(indels);
            }
            Err(e) => {
                log::warn!("skipping {}: {}", sample.id, e);
                report.failures.push(SampleFailure::from_error(&sample.id, &e));
            }
        }
    }

    let catalog = IndelCatalog::from_samples(&scanned);
    report.samples_processed = scanned.len();
    report.insertions = catalog.insertions().len();
    report.deletions = catalog.deletions().len();
    report.msa_lengths = msa.distinct_lengths();

    log::info!(
        "recorded {} insertion(s) and {} deletion(s) across {} sample(s)",
        report.insertions,
        report.deletions,
        report.samples_processed
    );
    if !report.failures.is_empty() {
        log::warn!("{} sample(s) could not be processed", report.failures.len());
    }
    if !msa.is_rectangular() {
        log::warn!(
            "alignment rows have differing lengths {:?}; columns are not consistent across samples",
            report.msa_lengths
        );
    }

    BatchOutput {
        catalog,
        msa,
        report,
    }
}

fn scan_all(
    reference: &Sequence,
    samples: &[Sequence],
    aligner: &dyn AlignmentProvider,
    config: &ScanConfig,
) -> Vec<Result<(PairwiseAlignment, SampleIndels)>> {
    let total = samples.len();
    let done = AtomicUsize::new(0);

    samples
        .par_iter()
        .map(|sample| {
            let outcome = align_and_scan(reference, sample, aligner, config);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n == 1 || n % PROGRESS_INTERVAL == 0 || n == total {
                log::info!("{}/{} complete", n, total);
            }
            outcome
        })
        .collect()
}

fn run_on_pool<T, F>(threads: usize, job: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(job),
        Err(e) => {
            log::warn!("could not build a {}-thread pool ({}); using the global pool", threads, e);
            job()
        }
    }
}
