//! vcmtools - per-cell consensus tables from single-cell alignments
//!
//! vcmtools summarises an indexed BAM at the positions of called variants,
//! separately for every cell barcode.
//!
//! # Tools
//!
//! - `vcm`: Variant Call Matrix, one consensus base per cell and variant
//! - `vff`: Variant Frequency Files, A/C/T/G read support per variant
//! - `merge`: merge per-cell VFF files into one table of consensus bases
//!
//! # Usage
//!
//! ```bash
//! # Consensus matrix over all cells listed in barcodes.tsv
//! vcmtools vcm sample.bam calls.vcf.gz barcodes.tsv --threads 8 --adaptive
//!
//! # One frequency file per cell, then merge them
//! vcmtools vff sample.bam calls.vcf.gz --barcodes barcodes.tsv --folder cells
//! vcmtools merge cells merged.tsv --min-coverage 2
//! ```

extern crate vcmtools_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;
use vcmtools_lib::utils;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Per-cell consensus tables from single-cell alignments
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Build a Variant Call Matrix
    Vcm(commands::VcmArgs),
    /// Build Variant Frequency Files
    Vff(commands::VffArgs),
    /// Merge Variant Frequency Files
    Merge(commands::MergeArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Vcm(args) => commands::run_vcm(args)?,
            Subcommand::Vff(args) => commands::run_vff(args)?,
            Subcommand::Merge(args) => commands::run_merge(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if utils::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
