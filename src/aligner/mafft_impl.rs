//! MAFFT aligner implementation (external process)

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;

use super::{alignment_from_records, AlignmentProvider};
use crate::alignment::PairwiseAlignment;
use crate::error::{IndelError, Result};
use crate::fasta::{self, Sequence};

pub struct MafftAligner {
    program: PathBuf,
    extra_args: Vec<String>,
    work_dir: PathBuf,
}

/// Write the unaligned pair to a temporary FASTA file inside `dir`.
fn write_pair(dir: &Path, reference: &Sequence, sample: &Sequence) -> Result<NamedTempFile> {
    let mut input = tempfile::Builder::new()
        .prefix("indelscan-pair-")
        .suffix(".fasta")
        .tempfile_in(dir)?;
    fasta::write_record(&mut input, &reference.id, &reference.data)?;
    fasta::write_record(&mut input, &sample.id, &sample.data)?;
    input.flush()?;
    Ok(input)
}

impl MafftAligner {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            extra_args: vec![
                "--auto".to_string(),
                "--preservecase".to_string(),
                "--quiet".to_string(),
            ],
            work_dir: std::env::temp_dir(),
        }
    }

    pub fn with_args(program: PathBuf, extra_args: Vec<String>) -> Self {
        Self {
            program,
            extra_args,
            work_dir: std::env::temp_dir(),
        }
    }

    /// Directory for the temporary input files.
    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = dir;
        self
    }
}

impl AlignmentProvider for MafftAligner {
    fn name(&self) -> &str {
        "mafft"
    }

    fn align(&self, reference: &Sequence, sample: &Sequence) -> Result<PairwiseAlignment> {
        let failure = |reason: String| IndelError::alignment_failure(&sample.id, reason);

        let input = write_pair(&self.work_dir, reference, sample).map_err(|e| {
            failure(format!(
                "could not write aligner input in {}: {}",
                self.work_dir.display(),
                e
            ))
        })?;

        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .arg(input.path())
            .output()
            .map_err(|e| failure(format!("could not run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let records = fasta::parse_fasta(Cursor::new(output.stdout))
            .map_err(|e| failure(format!("unreadable aligner output: {}", e)))?;
        alignment_from_records(&sample.id, records)
    }
}
