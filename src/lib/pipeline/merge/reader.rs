//! Streaming reader for Variant Frequency Files.

use serde::Deserialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, VcmError};
use crate::core::io::get_reader;
use crate::pipeline::tables::VFF_FIELDS;

/// One parsed VFF row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VffRow {
    pub contig: String,
    pub position: i64,
    pub reference: String,
    pub a: u32,
    pub c: u32,
    pub t: u32,
    pub g: u32,
    pub total: u32,
}

impl VffRow {
    /// Base with the highest count, scanning A, C, T, G; the first maximum wins.
    pub fn max_base(&self) -> (char, u32) {
        let mut best = ('A', self.a);
        for (base, count) in [('C', self.c), ('T', self.t), ('G', self.g)] {
            if count > best.1 {
                best = (base, count);
            }
        }
        best
    }

    #[inline]
    pub fn key(&self) -> (&str, i64) {
        (&self.contig, self.position)
    }
}

/// Row iterator over one VFF file; the header line is skipped.
pub struct VffReader {
    path: PathBuf,
    reader: csv::Reader<Box<dyn BufRead>>,
    record: csv::StringRecord,
}

impl VffReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let input = get_reader(&path)?;
        Ok(Self::from_reader(path, input))
    }

    pub(crate) fn from_reader(path: PathBuf, input: Box<dyn BufRead>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(input);
        Self {
            path,
            reader,
            record: csv::StringRecord::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_current(&self) -> Result<VffRow> {
        let line = self.record.position().map_or(0, |p| p.line());
        if self.record.len() != VFF_FIELDS {
            return Err(VcmError::MalformedTableRow {
                path: self.path.clone(),
                line,
                expected: VFF_FIELDS,
                found: self.record.len(),
            });
        }
        self.record
            .deserialize(None)
            .map_err(|err| VcmError::InvalidTableValue {
                path: self.path.clone(),
                line,
                field: err.to_string(),
            })
    }
}

impl Iterator for VffReader {
    type Item = Result<VffRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(self.parse_current()),
            Ok(false) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}
