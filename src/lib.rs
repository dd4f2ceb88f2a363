//! indelscan - reference-relative indel discovery from pairwise alignments
//!
//! Every sample is aligned to the reference on its own. Gap runs in the
//! reference row are insertions, gap runs in the sample row are deletions;
//! both are reported with reference coordinates, alignment columns and
//! flanking reference context. The sample rows are also stacked into a
//! pseudo multiple alignment.

pub mod aligner;
pub mod alignment;
pub mod batch;
pub mod catalog;
pub mod context;
pub mod coordinates;
pub mod error;
pub mod fasta;
pub mod gap_runs;
pub mod msa;
pub mod scanner;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

pub use aligner::{create_aligner, AlignerConfig, AlignerKind, AlignmentProvider, AlignmentScores};
pub use alignment::PairwiseAlignment;
pub use batch::{process_batch, BatchOptions, BatchOutput, BatchReport, FailureKind, SampleFailure};
pub use catalog::{EmptyCatalogPolicy, IndelCatalog};
pub use error::{IndelError, Result};
pub use fasta::{load_input, load_reference, load_sequences, Sequence};
pub use gap_runs::IndelKind;
pub use msa::{MsaMode, PseudoMsa};
pub use scanner::{scan_alignment, IndelRecord, SampleIndels, ScanConfig};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "indelscan",
    version,
    about = "Find insertions and deletions in samples aligned pairwise to a reference"
)]
pub struct Args {
    /// Multi-sequence FASTA file, or a directory of FASTA files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Reference genome FASTA (first record is used)
    #[arg(short = 'r', long = "ref-path")]
    pub ref_path: PathBuf,

    /// Prefix for output files (default: today's date)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Number of threads
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Pairwise alignment backend
    #[arg(long, value_enum, default_value_t = AlignerKind::Wfa)]
    pub aligner: AlignerKind,

    /// MAFFT executable used with `--aligner mafft`
    #[arg(long, default_value = "mafft")]
    pub mafft_path: PathBuf,

    /// WFA scores (match,mismatch,gap_open,gap_extend[,gap2_open,gap2_extend])
    #[arg(short = 'S', long = "scores", default_value = "0,5,8,2,24,1")]
    pub scores: String,

    /// Keep pairwise alignments in this directory and reuse existing ones
    #[arg(long)]
    pub alignment_dir: Option<PathBuf>,

    /// Flanking reference bases reported on each side of an indel
    #[arg(long, default_value_t = context::DEFAULT_CONTEXT_WIDTH)]
    pub context_width: usize,

    /// How sample rows are stacked into the output alignment
    #[arg(long, value_enum, default_value_t = MsaMode::Concatenate)]
    pub msa_mode: MsaMode,

    /// Write only the header when no indels are found
    #[arg(long)]
    pub header_only_empty: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn aligner_config(&self) -> Result<AlignerConfig> {
        Ok(AlignerConfig {
            kind: self.aligner,
            scores: AlignmentScores::parse(&self.scores)?,
            mafft_path: self.mafft_path.clone(),
            cache_dir: self.alignment_dir.clone(),
        })
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            threads: self.threads,
            scan: ScanConfig {
                context_width: self.context_width,
            },
            msa_mode: self.msa_mode,
        }
    }

    pub fn empty_policy(&self) -> EmptyCatalogPolicy {
        if self.header_only_empty {
            EmptyCatalogPolicy::HeaderOnly
        } else {
            EmptyCatalogPolicy::Placeholder
        }
    }
}

/// Files written by one run.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub multifasta: Option<PathBuf>,
    pub indels: PathBuf,
    pub alignment: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            multifasta: None,
            indels: dir.join(format!("{}_indels.csv", prefix)),
            alignment: dir.join(format!("{}.alignment.fasta", prefix)),
            summary: dir.join(format!("{}_summary.json", prefix)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: BatchReport,
    pub paths: OutputPaths,
}

fn create_writer(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Run the full pipeline with the aligner selected by `args`.
pub fn run_indelscan(args: &Args) -> anyhow::Result<RunOutcome> {
    let config = args.aligner_config()?;
    let aligner = create_aligner(&config);
    run_with_aligner(args, aligner.as_ref())
}

/// Run the full pipeline with a caller-supplied aligner.
pub fn run_with_aligner(args: &Args, aligner: &dyn AlignmentProvider) -> anyhow::Result<RunOutcome> {
    let reference = load_reference(&args.ref_path)
        .with_context(|| format!("cannot read reference {}", args.ref_path.display()))?;
    log::info!("reference {} ({} bp)", reference.id, reference.len());

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {}", args.output.display()))?;
    let prefix = args.prefix();
    let mut paths = OutputPaths::new(&args.output, &prefix);

    let samples = load_input(&args.input)
        .with_context(|| format!("cannot read samples from {}", args.input.display()))?;
    if args.input.is_dir() {
        log::info!("input type: directory with multiple FASTA files");
        let path = args.output.join(format!("{}_multifasta.fasta", prefix));
        let mut writer = create_writer(&path)?;
        fasta::write_sequences(&mut writer, &samples)?;
        writer.flush()?;
        log::info!("multi sequence FASTA saved to {}", path.display());
        paths.multifasta = Some(path);
    } else {
        log::info!("input type: single multi-sequence FASTA file");
    }

    log::info!("aligning each sample to the reference with {}", aligner.name());
    let output = process_batch(&reference, samples, aligner, &args.batch_options());

    let mut writer = create_writer(&paths.indels)?;
    output.catalog.write_csv(&mut writer, args.empty_policy())?;
    writer.flush()?;
    log::info!("indel table: {}", paths.indels.display());

    let mut writer = create_writer(&paths.alignment)?;
    output.msa.write_fasta(&mut writer)?;
    writer.flush()?;
    log::info!(
        "alignment has {} sequences of length(s) {:?}: {}",
        output.msa.len(),
        output.report.msa_lengths,
        paths.alignment.display()
    );

    let mut writer = create_writer(&paths.summary)?;
    serde_json::to_writer_pretty(&mut writer, &output.report)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(RunOutcome {
        report: output.report,
        paths,
    })
}
