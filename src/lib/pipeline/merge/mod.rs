//! Merge per-cell Variant Frequency Files into one encoded sequence table.
//!
//! Each cell table is reduced to one consensus [`Symbol`] per row and packed
//! into an [`EncodedSequence`]. The first table (by file name) supplies the
//! `(contig, position)` keys of the merged rows; output stops at the shortest
//! per-cell sequence.

pub mod encoding;
pub mod reader;

pub use encoding::{EncodedSequence, Symbol};
pub use reader::{VffReader, VffRow};

use log::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, VcmError};
use crate::core::fs::file_stem_string;
use crate::pipeline::tables::{merged_header, merged_line};
use crate::pipeline::vff::VFF_EXTENSION;

/// Thresholds and checks applied while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    /// Coverage at or below this value yields `N`.
    pub min_coverage: u32,
    /// A winning count at or below this value yields `N`.
    pub min_frequency: u32,
    /// Require identical `(contig, position)` at every shared row index.
    pub verify_alignment: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_coverage: 0,
            min_frequency: 0,
            verify_alignment: true,
        }
    }
}

/// Consensus symbol of one VFF row.
pub fn consensus_symbol(row: &VffRow, min_coverage: u32, min_frequency: u32) -> Symbol {
    let (base, frequency) = row.max_base();
    if row.total <= min_coverage || frequency <= min_frequency {
        return Symbol::N;
    }
    match base {
        'A' => Symbol::A,
        'C' => Symbol::C,
        'T' => Symbol::T,
        'G' => Symbol::G,
        _ => Symbol::N,
    }
}

/// Per-cell input of the merge.
#[derive(Debug, Clone)]
pub struct CellTable {
    pub name: String,
    pub path: PathBuf,
}

/// `*.vff` files of `folder`, sorted by file name.
pub fn list_cell_tables<P: AsRef<Path>>(folder: P) -> Result<Vec<CellTable>> {
    let folder = folder.as_ref();
    let mut tables = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != VFF_EXTENSION) {
            continue;
        }
        if let Some(name) = file_stem_string(&path) {
            tables.push(CellTable { name, path });
        }
    }
    if tables.is_empty() {
        return Err(VcmError::config(format!(
            "No .{} files found in {}",
            VFF_EXTENSION,
            folder.display()
        )));
    }
    tables.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(tables)
}

type RowKey = (String, i64);

fn read_keys<P: AsRef<Path>>(path: P) -> Result<Vec<RowKey>> {
    VffReader::from_path(path)?
        .map(|row| row.map(|row| (row.contig, row.position)))
        .collect()
}

/// Reduce one cell table to its encoded consensus sequence.
pub fn encode_cell_table(
    table: &CellTable,
    keys: &[RowKey],
    config: &MergeConfig,
) -> Result<EncodedSequence> {
    let mut sequence = EncodedSequence::with_capacity(keys.len());
    let mut reader = VffReader::from_path(&table.path)?;
    let mut index = 0;
    while let Some(row) = reader.next() {
        let row = row?;
        if config.verify_alignment {
            if let Some((contig, position)) = keys.get(index) {
                if row.key() != (contig.as_str(), *position) {
                    return Err(VcmError::MisalignedTableRow {
                        path: reader.path().to_path_buf(),
                        line: index as u64 + 2,
                        expected: format!("{}:{}", contig, position),
                        found: format!("{}:{}", row.contig, row.position),
                    });
                }
            }
        }
        sequence.push(consensus_symbol(&row, config.min_coverage, config.min_frequency));
        index += 1;
    }
    debug!(
        "Encoded {} rows of {} into {} bytes",
        sequence.len(),
        reader.path().display(),
        sequence.byte_len()
    );
    Ok(sequence)
}

/// Merge every VFF in `folder` into `out`, returning the number of rows written.
pub fn merge_folder<P: AsRef<Path>, W: Write + ?Sized>(
    folder: P,
    config: &MergeConfig,
    out: &mut W,
) -> Result<usize> {
    let tables = list_cell_tables(folder)?;
    info!("Merging {} cell tables.", tables.len());

    let keys = read_keys(&tables[0].path)?;
    let mut sequences = Vec::with_capacity(tables.len());
    for table in &tables {
        debug!("Encoding {}", table.path.display());
        let sequence = encode_cell_table(table, &keys, config)?;
        if sequence.len() != keys.len() {
            warn!(
                "{} has {} rows, reference has {}.",
                table.path.display(),
                sequence.len(),
                keys.len()
            );
        }
        sequences.push(sequence);
    }

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    write_merged(out, &names, &keys, &sequences)
}

/// Emit the merged table, stopping when any sequence runs out.
pub fn write_merged<W: Write + ?Sized>(
    out: &mut W,
    names: &[&str],
    keys: &[RowKey],
    sequences: &[EncodedSequence],
) -> Result<usize> {
    out.write_all(merged_header(names).as_bytes())?;

    let mut iterators: Vec<_> = sequences.iter().map(|s| s.symbols()).collect();
    let mut row = Vec::with_capacity(iterators.len());
    let mut written = 0;
    'rows: for (contig, position) in keys {
        row.clear();
        for symbols in iterators.iter_mut() {
            match symbols.next() {
                Some(symbol) => row.push(symbol.as_char()),
                None => break 'rows,
            }
        }
        out.write_all(merged_line(contig, &position.to_string(), &row).as_bytes())?;
        written += 1;
    }
    out.flush()?;
    info!("Wrote {} merged rows.", written);
    Ok(written)
}
