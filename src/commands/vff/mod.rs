mod args;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;
use std::convert::TryFrom;
use std::fs;
use std::io::Write;
use std::path::Path;
use vcmtools_lib::engine::par_variants::ParVariants;
use vcmtools_lib::pipeline::barcode::BarcodeSet;
use vcmtools_lib::pipeline::sources::{HtsAlignmentSource, HtsVariantSource};
use vcmtools_lib::pipeline::tables::vff_header;
use vcmtools_lib::pipeline::vff::{make_vff, vff_path, VffProcessor};
use vcmtools_lib::utils;

use crate::commands::common;

pub use args::{VffArgs, VffConfig, VffMode};

/// Entry point for the `vff` command.
pub fn run_vff(args: VffArgs) -> Result<()> {
    let config = VffConfig::try_from(args)?;
    info!("Running vcmtools vff on {:?}", config.inputs.bam);

    fs::create_dir_all(&config.folder)
        .with_context(|| format!("Failed to create {}", config.folder.display()))?;
    common::prepare_bam(&config.inputs.bam, config.scheduler.workers)?;

    match &config.mode {
        VffMode::Barcodes(list) => run_barcodes(&config, list),
        VffMode::Barcode { barcode, output } => {
            run_scheduled(&config, output, Some(barcode.as_str()))
        }
        VffMode::Bulk(output) => run_scheduled(&config, output, None),
    }
}

/// One file per barcode, built in parallel on a dedicated pool.
fn run_barcodes(config: &VffConfig, list: &Path) -> Result<()> {
    let barcodes = BarcodeSet::from_file(list)
        .with_context(|| format!("Failed to read barcodes from {}", list.display()))?;
    info!("Loaded {} barcodes", barcodes.len());

    let pool = utils::build_rayon_pool(config.scheduler.workers)?;
    pool.install(|| {
        barcodes
            .ordered_barcodes()
            .par_iter()
            .try_for_each(|barcode| -> Result<()> {
                let output = vff_path(&config.folder, barcode);
                if utils::keep_existing(&output, config.remake) {
                    return Ok(());
                }
                if config.scheduler.message {
                    info!("Processing barcode: {}", barcode);
                }
                make_vff(&output, &config.inputs, Some(barcode.as_str()))
                    .with_context(|| format!("Failed to build {}", output.display()))?;
                Ok(())
            })
    })?;

    info!("Wrote {} barcode files to {:?}", barcodes.len(), config.folder);
    Ok(())
}

/// A single file produced by the variant scheduler.
fn run_scheduled(config: &VffConfig, output: &Path, barcode: Option<&str>) -> Result<()> {
    if utils::keep_existing(output, config.remake) {
        return Ok(());
    }

    let variants = HtsVariantSource::from_path(&config.inputs.vcf)
        .with_context(|| format!("Failed to open {}", config.inputs.vcf.display()))?;
    let bam = &config.inputs.bam;
    let alignment = &config.inputs.alignment;
    let runner = ParVariants::new(
        config.scheduler.clone(),
        VffProcessor::new(barcode.map(str::to_string)),
        || HtsAlignmentSource::from_path(bam, alignment),
    )?;

    utils::make_parent_dirs(output)?;
    let mut writer = utils::table_writer(output, 1)?;
    writer.write_all(vff_header().as_bytes())?;
    let summary = runner.run(variants, &mut writer)?;
    writer
        .finish()
        .with_context(|| format!("Failed to finish {}", output.display()))?;

    info!(
        "Processed {} variants ({} filtered out) -> {:?}",
        summary.seen, summary.dropped, output
    );
    Ok(())
}
