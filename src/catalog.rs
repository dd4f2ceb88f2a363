//! Aggregation of per-sample indel events into the output table.

use std::io::Write;

use crate::error::Result;
use crate::scanner::{IndelRecord, SampleIndels};

/// Column order of the indel table.
pub const COLUMNS: [&str; 7] = [
    "accession_id",
    "indel",
    "ref_start_pos",
    "seq_start_pos",
    "length",
    "upstream_ref",
    "downstream_ref",
];

/// What to write when no sample produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCatalogPolicy {
    /// Header followed by a single row of empty values.
    #[default]
    Placeholder,
    HeaderOnly,
}

/// Insertions of every sample followed by deletions of every sample, each
/// group in sample order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndelCatalog {
    records: Vec<IndelRecord>,
    insertion_count: usize,
}

impl IndelCatalog {
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a SampleIndels>,
        I::IntoIter: Clone,
    {
        let samples = samples.into_iter();
        let mut records: Vec<IndelRecord> = samples
            .clone()
            .flat_map(|s| s.insertions.iter().cloned())
            .collect();
        let insertion_count = records.len();
        records.extend(samples.flat_map(|s| s.deletions.iter().cloned()));

        Self {
            records,
            insertion_count,
        }
    }

    pub fn records(&self) -> &[IndelRecord] {
        &self.records
    }

    pub fn insertions(&self) -> &[IndelRecord] {
        &self.records[..self.insertion_count]
    }

    pub fn deletions(&self) -> &[IndelRecord] {
        &self.records[self.insertion_count..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV.
    pub fn write_csv<W: Write>(&self, writer: W, policy: EmptyCatalogPolicy) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(COLUMNS)?;

        if self.records.is_empty() {
            if policy == EmptyCatalogPolicy::Placeholder {
                csv_writer.write_record(COLUMNS.map(|_| ""))?;
            }
        } else {
            for record in &self.records {
                csv_writer.serialize(record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}
