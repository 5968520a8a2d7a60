use std::convert::TryFrom;
use std::path::PathBuf;
use structopt::StructOpt;
use vcmtools_lib::core::error::VcmError;
use vcmtools_lib::engine::par_variants::SchedulerConfig;
use vcmtools_lib::pipeline::sources::{AlignmentOptions, CELL_BARCODE_TAG};
use vcmtools_lib::pipeline::vff::{vff_path, VffInputs};
use vcmtools_lib::utils;

use crate::commands::common::{self, SchedulerArgs};

/// Arguments for the `vff` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "vff",
    about = "Count base support at every variant, per cell or for the whole sample"
)]
pub struct VffArgs {
    /// Input BAM file. An index is built when `<bam>.bai` is missing.
    #[structopt(parse(from_os_str))]
    pub bam: PathBuf,

    /// Variants to summarise (VCF or BCF, optionally bgzipped).
    #[structopt(parse(from_os_str))]
    pub vcf: PathBuf,

    /// Output folder for per-cell files. Defaults to the BAM path without its extension.
    #[structopt(long, parse(from_os_str))]
    pub folder: Option<PathBuf>,

    /// Output file when no barcode option is given. Defaults to `<folder>/<bam stem>.vff`.
    #[structopt(long, parse(from_os_str))]
    pub vff: Option<PathBuf>,

    /// Write one file per barcode listed in this file.
    #[structopt(long, parse(from_os_str), conflicts_with = "barcode")]
    pub barcodes: Option<PathBuf>,

    /// Write a single file for this barcode only.
    #[structopt(long)]
    pub barcode: Option<String>,

    /// Only process variants whose FILTER is PASS.
    #[structopt(long)]
    pub pass_only: bool,

    /// Minimum mapping quality.
    #[structopt(long, short = "q", default_value = "0")]
    pub min_mapq: u8,

    /// Cell barcode tag name.
    #[structopt(long, default_value = CELL_BARCODE_TAG)]
    pub cb_tag: String,

    /// Rebuild outputs even when they already exist.
    #[structopt(long)]
    pub remake: bool,

    #[structopt(flatten)]
    pub scheduler: SchedulerArgs,
}

/// Which reads end up in which file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VffMode {
    /// One file per barcode read from the given list.
    Barcodes(PathBuf),
    /// One file for a single barcode.
    Barcode { barcode: String, output: PathBuf },
    /// One file counting every read.
    Bulk(PathBuf),
}

/// Normalised configuration derived from [`VffArgs`].
#[derive(Debug, Clone)]
pub struct VffConfig {
    pub inputs: VffInputs,
    pub folder: PathBuf,
    pub mode: VffMode,
    pub scheduler: SchedulerConfig,
    pub remake: bool,
}

impl TryFrom<VffArgs> for VffConfig {
    type Error = VcmError;

    fn try_from(args: VffArgs) -> Result<Self, Self::Error> {
        let folder = args
            .folder
            .clone()
            .unwrap_or_else(|| common::default_vff_folder(&args.bam));

        let mode = match (args.barcodes, args.barcode) {
            (Some(_), Some(_)) => {
                return Err(VcmError::config("--barcodes and --barcode are mutually exclusive"))
            }
            (Some(list), None) => VffMode::Barcodes(list),
            (None, Some(barcode)) => VffMode::Barcode {
                output: vff_path(&folder, &barcode),
                barcode,
            },
            (None, None) => {
                let output = match args.vff {
                    Some(output) => output,
                    None => {
                        let stem = utils::file_stem_string(&args.bam).ok_or_else(|| {
                            VcmError::config(format!(
                                "Cannot derive a name from {}",
                                args.bam.display()
                            ))
                        })?;
                        vff_path(&folder, &stem)
                    }
                };
                VffMode::Bulk(output)
            }
        };

        Ok(VffConfig {
            inputs: VffInputs {
                alignment: AlignmentOptions {
                    min_mapq: args.min_mapq,
                    cell_barcode_tag: args.cb_tag,
                    require_barcode: !matches!(mode, VffMode::Bulk(_)),
                },
                bam: args.bam,
                vcf: args.vcf,
                pass_only: args.pass_only,
            },
            scheduler: args.scheduler.to_config(args.pass_only)?,
            folder,
            mode,
            remake: args.remake,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> VffConfig {
        let mut argv = vec!["vff", "/data/sample.bam", "calls.vcf"];
        argv.extend_from_slice(args);
        VffConfig::try_from(VffArgs::from_iter_safe(argv).unwrap()).unwrap()
    }

    #[test]
    fn bulk_mode_counts_every_read() {
        let config = config(&[]);
        assert_eq!(config.folder, PathBuf::from("/data/sample"));
        assert_eq!(
            config.mode,
            VffMode::Bulk(PathBuf::from("/data/sample/sample.vff"))
        );
        assert!(!config.inputs.alignment.require_barcode);
        assert_eq!(config.inputs.alignment.min_mapq, 0);
        assert!(!config.inputs.pass_only);
        assert!(!config.scheduler.pass_only);
    }

    #[test]
    fn explicit_bulk_output() {
        let config = config(&["--vff", "all.vff", "--pass-only"]);
        assert_eq!(config.mode, VffMode::Bulk(PathBuf::from("all.vff")));
        assert!(config.inputs.pass_only);
        assert!(config.scheduler.pass_only);
    }

    #[test]
    fn single_barcode_file_in_folder() {
        let config = config(&["--barcode", "AAACGT-1", "--folder", "cells"]);
        assert_eq!(
            config.mode,
            VffMode::Barcode {
                barcode: "AAACGT-1".into(),
                output: PathBuf::from("cells/AAACGT-1.vff"),
            }
        );
        assert!(config.inputs.alignment.require_barcode);
    }

    #[test]
    fn barcode_list_mode() {
        let config = config(&["--barcodes", "barcodes.tsv"]);
        assert_eq!(config.mode, VffMode::Barcodes(PathBuf::from("barcodes.tsv")));
    }

    #[test]
    fn barcode_options_conflict() {
        assert!(VffArgs::from_iter_safe(&[
            "vff",
            "s.bam",
            "v.vcf",
            "--barcodes",
            "b.tsv",
            "--barcode",
            "AAAC",
        ])
        .is_err());
    }
}
