use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{IndelError, Result};

/// Line width used when writing FASTA records.
pub const LINE_WIDTH: usize = 60;

const FASTA_EXTENSIONS: [&str; 3] = ["fa", "fasta", "fna"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub data: Vec<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parse FASTA records from a reader.
///
/// The record id is the first whitespace-delimited token of the header line;
/// sequence lines are concatenated with surrounding whitespace removed.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current: Option<Sequence> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                sequences.push(done);
            }
            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(IndelError::InvalidInput(format!(
                    "empty FASTA header at line {}",
                    line_no + 1
                )));
            }
            current = Some(Sequence::new(id, Vec::new()));
        } else if !line.trim().is_empty() {
            match current.as_mut() {
                Some(seq) => seq.data.extend(line.trim().bytes()),
                None => {
                    return Err(IndelError::InvalidInput(format!(
                        "sequence data before first FASTA header at line {}",
                        line_no + 1
                    )))
                }
            }
        }
    }

    if let Some(done) = current {
        sequences.push(done);
    }
    Ok(sequences)
}

pub fn load_sequences(path: &Path) -> Result<Vec<Sequence>> {
    let file = File::open(path)?;
    parse_fasta(BufReader::new(file))
}

/// The reference is the first record of its FASTA file.
pub fn load_reference(path: &Path) -> Result<Sequence> {
    load_sequences(path)?.into_iter().next().ok_or_else(|| {
        IndelError::InvalidInput(format!("no reference record in {}", path.display()))
    })
}

/// FASTA files directly inside `dir`, sorted by file name.
pub fn fasta_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_fasta = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FASTA_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if path.is_file() && is_fasta {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load samples from a multi-record FASTA file or a directory of FASTA files.
pub fn load_input(path: &Path) -> Result<Vec<Sequence>> {
    if path.is_dir() {
        let mut sequences = Vec::new();
        for file in fasta_files_in(path)? {
            log::debug!("reading {}", file.display());
            sequences.extend(load_sequences(&file)?);
        }
        Ok(sequences)
    } else {
        load_sequences(path)
    }
}

pub fn write_record<W: Write>(writer: &mut W, id: &str, data: &[u8]) -> Result<()> {
    writeln!(writer, ">{}", id)?;
    for chunk in data.chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_sequences<W: Write>(writer: &mut W, sequences: &[Sequence]) -> Result<()> {
    for seq in sequences {
        write_record(writer, &seq.id, &seq.data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_multiline_records_and_descriptions() {
        let input = ">s1 some description\nACG\nTGA\n>s2\r\nTTTT\r\n";
        let seqs = parse_fasta(Cursor::new(input)).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].id, "s1");
        assert_eq!(seqs[0].data, b"ACGTGA".to_vec());
        assert_eq!(seqs[1].id, "s2");
        assert_eq!(seqs[1].data, b"TTTT".to_vec());
    }

    #[test]
    fn rejects_data_before_header() {
        let err = parse_fasta(Cursor::new("ACGT\n>s1\nAC\n")).unwrap_err();
        assert!(matches!(err, IndelError::InvalidInput(_)));
    }

    #[test]
    fn rejects_empty_header() {
        let err = parse_fasta(Cursor::new(">\nACGT\n")).unwrap_err();
        assert!(matches!(err, IndelError::InvalidInput(_)));
    }

    #[test]
    fn writes_wrapped_lines() {
        let data = vec![b'A'; 130];
        let mut out = Vec::new();
        write_record(&mut out, "long", &data).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], ">long");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
    }

    #[test]
    fn written_records_parse_back() {
        let seqs = vec![Sequence::new("a", "ACGT"), Sequence::new("b", "GG")];
        let mut out = Vec::new();
        write_sequences(&mut out, &seqs).unwrap();
        assert_eq!(parse_fasta(Cursor::new(out)).unwrap(), seqs);
    }
}
