//! htslib-backed alignment and variant sources.
//!
//! Both readers are consumed through narrow adapters: [`HtsAlignmentSource`]
//! implements [`AlignmentSource`] and [`HtsVariantSource`] is an iterator of
//! [`VariantRecord`]s. Everything they yield is owned, so no htslib handle
//! crosses a worker boundary.

use log::info;
use rust_htslib::bam::{self, ext::BamRecordExtensions, record::Aux, Read as BamRead};
use rust_htslib::bcf::{self, Read as BcfRead};
use std::path::{Path, PathBuf};

use crate::core::error::{Result, VcmError};
use crate::core::read_filter::{DefaultReadFilter, ReadFilter};
use crate::engine::par_variants::{AlignmentSource, Variant, VariantRecord};
use crate::engine::pileup::AlignedRead;

/// Default cell barcode tag.
pub const CELL_BARCODE_TAG: &str = "CB";

const PASS: &[u8] = b"PASS";

/// Options applied while projecting alignment records.
#[derive(Debug, Clone)]
pub struct AlignmentOptions {
    pub min_mapq: u8,
    /// Two-letter tag holding the cell barcode.
    pub cell_barcode_tag: String,
    /// Drop reads that do not carry the barcode tag.
    pub require_barcode: bool,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            min_mapq: 0,
            cell_barcode_tag: CELL_BARCODE_TAG.to_string(),
            require_barcode: true,
        }
    }
}

/// Indexed BAM/CRAM reader yielding [`AlignedRead`] projections.
pub struct HtsAlignmentSource {
    reader: bam::IndexedReader,
    read_filter: DefaultReadFilter,
    tag: [u8; 2],
    require_barcode: bool,
}

impl HtsAlignmentSource {
    pub fn from_path<P: AsRef<Path>>(path: P, options: &AlignmentOptions) -> Result<Self> {
        let tag: [u8; 2] = options
            .cell_barcode_tag
            .as_bytes()
            .try_into()
            .map_err(|_| {
                VcmError::config(format!(
                    "Barcode tag must be 2 bytes long, got '{}'",
                    options.cell_barcode_tag
                ))
            })?;
        let reader = bam::IndexedReader::from_path(path.as_ref())?;
        Ok(Self {
            reader,
            read_filter: DefaultReadFilter::new(options.min_mapq),
            tag,
            require_barcode: options.require_barcode,
        })
    }

    fn project(&self, record: &bam::Record) -> Option<AlignedRead> {
        if !self.read_filter.filter_read(record) {
            return None;
        }

        let cell_barcode = match record.aux(&self.tag) {
            Ok(Aux::String(value)) => Some(value.to_string()),
            _ => None,
        };
        if self.require_barcode && cell_barcode.is_none() {
            return None;
        }

        let aligned_pairs = record
            .aligned_pairs_full()
            .map(|[query, reference]| (query.map(|q| q as usize), reference))
            .collect();

        Some(AlignedRead::new(
            String::from_utf8_lossy(record.qname()),
            cell_barcode,
            aligned_pairs,
            record.seq().as_bytes(),
        ))
    }
}

impl AlignmentSource for HtsAlignmentSource {
    fn fetch(&mut self, contig: &str, start: i64, stop: i64) -> Result<Vec<AlignedRead>> {
        self.reader.fetch((contig.as_bytes(), start, stop))?;

        let mut reads = Vec::new();
        let mut record = bam::Record::new();
        while let Some(result) = self.reader.read(&mut record) {
            result?;
            if let Some(read) = self.project(&record) {
                reads.push(read);
            }
        }
        Ok(reads)
    }
}

/// VCF/BCF reader yielding owned [`VariantRecord`]s in file order.
pub struct HtsVariantSource {
    reader: bcf::Reader,
    record: bcf::Record,
}

impl HtsVariantSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = bcf::Reader::from_path(path.as_ref())?;
        let record = reader.empty_record();
        Ok(Self { reader, record })
    }

    fn convert(record: &bcf::Record) -> Result<VariantRecord> {
        let header = record.header();
        let rid = record
            .rid()
            .ok_or_else(|| VcmError::config("Variant record without a contig"))?;
        let contig = String::from_utf8_lossy(header.rid2name(rid)?).into_owned();
        let start = record.pos();
        let reference = record
            .alleles()
            .first()
            .map(|allele| String::from_utf8_lossy(allele).into_owned())
            .unwrap_or_default();

        let mut variant = Variant::new(&contig, start, &reference);
        variant.stop = record.end();

        let passed = record
            .filters()
            .any(|id| header.id_to_name(id).as_slice() == PASS);
        Ok(VariantRecord::new(variant, passed))
    }
}

impl Iterator for HtsVariantSource {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read(&mut self.record)? {
            Ok(()) => Some(Self::convert(&self.record)),
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Location of the BAI index htslib looks for next to `bam`.
pub fn bai_path<P: AsRef<Path>>(bam: P) -> PathBuf {
    let mut name = bam.as_ref().as_os_str().to_owned();
    name.push(".bai");
    PathBuf::from(name)
}

/// Build `<bam>.bai` unless it already exists.
pub fn ensure_bam_index<P: AsRef<Path>>(bam: P, threads: usize) -> Result<()> {
    let bam = bam.as_ref();
    let index = bai_path(bam);
    if index.is_file() {
        return Ok(());
    }
    info!("Indexing {} -> {}", bam.display(), index.display());
    bam::index::build(bam, None, bam::index::Type::Bai, threads.max(1) as u32)?;
    Ok(())
}
