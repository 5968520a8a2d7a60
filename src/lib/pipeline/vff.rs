//! Variant Frequency File processor and per-cell file driver.

use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::core::fs::make_parent_dirs;
use crate::core::io::table_writer;
use crate::engine::par_variants::{run_serial, RunSummary, Variant, VariantProcessor};
use crate::engine::pileup::AlignedRead;
use crate::pipeline::frequency::base_frequencies;
use crate::pipeline::sources::{AlignmentOptions, HtsAlignmentSource, HtsVariantSource};
use crate::pipeline::tables::{vff_header, vff_line};

/// File extension of Variant Frequency Files.
pub const VFF_EXTENSION: &str = "vff";

/// Emits one VFF row per variant, optionally counting one cell only.
#[derive(Debug, Clone, Default)]
pub struct VffProcessor {
    target: Option<String>,
}

impl VffProcessor {
    pub fn new(target: Option<String>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl VariantProcessor for VffProcessor {
    fn process_variant(&self, variant: &Variant, reads: &[AlignedRead]) -> Result<String> {
        let frequencies = base_frequencies(reads, variant.start, self.target())?;
        Ok(vff_line(variant, &frequencies))
    }
}

/// `<folder>/<name>.vff`
pub fn vff_path<P: AsRef<Path>>(folder: P, name: &str) -> PathBuf {
    folder.as_ref().join(format!("{}.{}", name, VFF_EXTENSION))
}

/// Inputs shared by every per-cell VFF built from one BAM/VCF pair.
#[derive(Debug, Clone)]
pub struct VffInputs {
    pub bam: PathBuf,
    pub vcf: PathBuf,
    pub alignment: AlignmentOptions,
    pub pass_only: bool,
}

/// Write one VFF for `barcode` (or all reads) on the calling thread.
///
/// Opens its own BAM and VCF handles, released when the file is complete.
pub fn make_vff<P: AsRef<Path>>(
    output: P,
    inputs: &VffInputs,
    barcode: Option<&str>,
) -> Result<RunSummary> {
    let output = output.as_ref();
    let mut source = HtsAlignmentSource::from_path(&inputs.bam, &inputs.alignment)?;
    let variants = HtsVariantSource::from_path(&inputs.vcf)?;
    let processor = VffProcessor::new(barcode.map(str::to_string));

    make_parent_dirs(output)?;
    let mut writer = table_writer(output, 1)?;
    writer.write_all(vff_header().as_bytes())?;
    let summary = run_serial(&mut source, &processor, variants, inputs.pass_only, &mut writer)?;
    writer.finish()?;
    info!("Wrote {} rows to {}", summary.written, output.display());
    Ok(summary)
}
