//! Reuse of pairwise alignments stored on disk, one `<sample>.alignment.fasta` per sample

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{alignment_from_records, AlignmentProvider};
use crate::alignment::PairwiseAlignment;
use crate::error::Result;
use crate::fasta::{self, Sequence};

pub struct CachedAligner {
    dir: PathBuf,
    inner: Box<dyn AlignmentProvider>,
}

/// File-system safe stem for a sample id.
///
/// Bytes outside `[A-Za-z0-9._-]` are written as `%XX`, so distinct ids
/// always map to distinct files.
pub fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for &b in id.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("%{:02X}", b));
        }
    }
    stem
}

impl CachedAligner {
    pub fn new(dir: PathBuf, inner: Box<dyn AlignmentProvider>) -> Self {
        Self { dir, inner }
    }

    pub fn path_for(&self, sample_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.alignment.fasta", file_stem(sample_id)))
    }

    fn store(&self, path: &Path, reference_id: &str, alignment: &PairwiseAlignment) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(File::create(path)?);
        fasta::write_record(&mut writer, reference_id, alignment.reference_row())?;
        fasta::write_record(&mut writer, alignment.accession(), alignment.sample_row())?;
        writer.flush()?;
        Ok(())
    }

    /// Stored alignment for `sample`, or `None` if its rows do not
    /// ungap to the current reference and sample.
    fn load(
        &self,
        path: &Path,
        reference: &Sequence,
        sample: &Sequence,
    ) -> Result<Option<PairwiseAlignment>> {
        let alignment = alignment_from_records(&sample.id, fasta::load_sequences(path)?)?;
        let current = alignment.ungapped_reference() == reference.data.to_ascii_uppercase()
            && alignment.ungapped_sample() == sample.data.to_ascii_uppercase();
        Ok(current.then_some(alignment))
    }
}

impl AlignmentProvider for CachedAligner {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn align(&self, reference: &Sequence, sample: &Sequence) -> Result<PairwiseAlignment> {
        let path = self.path_for(&sample.id);
        if path.is_file() {
            match self.load(&path, reference, sample) {
                Ok(Some(alignment)) => {
                    log::debug!("reusing stored alignment {}", path.display());
                    return Ok(alignment);
                }
                Ok(None) => log::debug!("stored alignment {} is stale; realigning", path.display()),
                Err(e) => log::warn!("ignoring unreadable alignment {}: {}", path.display(), e),
            }
        }

        let alignment = self.inner.align(reference, sample)?;
        if let Err(e) = self.store(&path, &reference.id, &alignment) {
            log::warn!("could not store alignment {}: {}", path.display(), e);
        }
        Ok(alignment)
    }
}
