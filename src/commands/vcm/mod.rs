mod args;

use anyhow::{Context, Result};
use log::info;
use std::convert::TryFrom;
use std::io::Write;
use vcmtools_lib::engine::par_variants::ParVariants;
use vcmtools_lib::pipeline::barcode::BarcodeSet;
use vcmtools_lib::pipeline::sources::{HtsAlignmentSource, HtsVariantSource};
use vcmtools_lib::pipeline::vcm::VcmProcessor;
use vcmtools_lib::utils;

use crate::commands::common;

pub use args::{VcmArgs, VcmConfig};

/// Entry point for the `vcm` command.
pub fn run_vcm(args: VcmArgs) -> Result<()> {
    let config = VcmConfig::try_from(args)?;
    if utils::keep_existing(&config.output, config.remake) {
        return Ok(());
    }

    info!("Running vcmtools vcm on {:?}", config.bam);
    let barcodes = BarcodeSet::from_file(&config.barcodes)
        .with_context(|| format!("Failed to read barcodes from {}", config.barcodes.display()))?;
    info!("Loaded {} barcodes", barcodes.len());

    common::prepare_bam(&config.bam, config.scheduler.workers)?;
    let variants = HtsVariantSource::from_path(&config.vcf)
        .with_context(|| format!("Failed to open {}", config.vcf.display()))?;

    let bam = &config.bam;
    let alignment = &config.alignment;
    let runner = ParVariants::new(
        config.scheduler.clone(),
        VcmProcessor::new(barcodes, config.min_coverage),
        || HtsAlignmentSource::from_path(bam, alignment),
    )?;

    utils::make_parent_dirs(&config.output)?;
    let mut writer = utils::table_writer(&config.output, 1)?;
    writer.write_all(runner.processor().header().as_bytes())?;
    let summary = runner.run(variants, &mut writer)?;
    writer
        .finish()
        .with_context(|| format!("Failed to finish {}", config.output.display()))?;

    info!(
        "Processed {} variants ({} filtered out) -> {:?}",
        summary.seen, summary.dropped, config.output
    );
    Ok(())
}
