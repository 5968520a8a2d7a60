use std::convert::TryFrom;
use std::path::PathBuf;
use structopt::StructOpt;
use vcmtools_lib::core::error::VcmError;
use vcmtools_lib::engine::par_variants::SchedulerConfig;
use vcmtools_lib::pipeline::sources::{AlignmentOptions, CELL_BARCODE_TAG};

use crate::commands::common::{self, SchedulerArgs};

/// Arguments for the `vcm` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "vcm",
    about = "Build a Variant Call Matrix with one consensus base per cell and variant"
)]
pub struct VcmArgs {
    /// Input BAM file. An index is built when `<bam>.bai` is missing.
    #[structopt(parse(from_os_str))]
    pub bam: PathBuf,

    /// Variants to summarise (VCF or BCF, optionally bgzipped).
    #[structopt(parse(from_os_str))]
    pub vcf: PathBuf,

    /// Cell barcodes, one per line. Their order is the column order of the matrix.
    #[structopt(parse(from_os_str))]
    pub barcodes: PathBuf,

    /// Output path. Defaults to `<bam stem>.vcm` in the current directory.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Cells with fewer reads at a variant are reported as `N`.
    #[structopt(long, default_value = "0")]
    pub min_coverage: usize,

    /// Minimum mapping quality.
    #[structopt(long, short = "q", default_value = "60")]
    pub min_mapq: u8,

    /// Cell barcode tag name.
    #[structopt(long, default_value = CELL_BARCODE_TAG)]
    pub cb_tag: String,

    /// Also process variants whose FILTER is not PASS.
    #[structopt(long)]
    pub include_failed: bool,

    /// Rebuild the output even when it already exists.
    #[structopt(long)]
    pub remake: bool,

    #[structopt(flatten)]
    pub scheduler: SchedulerArgs,
}

/// Normalised configuration derived from [`VcmArgs`].
#[derive(Debug, Clone)]
pub struct VcmConfig {
    pub bam: PathBuf,
    pub vcf: PathBuf,
    pub barcodes: PathBuf,
    pub output: PathBuf,
    pub min_coverage: usize,
    pub alignment: AlignmentOptions,
    pub scheduler: SchedulerConfig,
    pub remake: bool,
}

impl TryFrom<VcmArgs> for VcmConfig {
    type Error = VcmError;

    fn try_from(args: VcmArgs) -> Result<Self, Self::Error> {
        let output = match args.output {
            Some(output) => output,
            None => common::default_vcm_output(&args.bam)?,
        };
        Ok(VcmConfig {
            scheduler: args.scheduler.to_config(!args.include_failed)?,
            alignment: AlignmentOptions {
                min_mapq: args.min_mapq,
                cell_barcode_tag: args.cb_tag,
                require_barcode: true,
            },
            bam: args.bam,
            vcf: args.vcf,
            barcodes: args.barcodes,
            output,
            min_coverage: args.min_coverage,
            remake: args.remake,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcmtools_lib::engine::par_variants::UnitSize;

    #[test]
    fn parses_positional_inputs_with_defaults() {
        let args = VcmArgs::from_iter_safe(&[
            "vcm",
            "sample.bam",
            "calls.vcf.gz",
            "barcodes.tsv",
            "--output",
            "out/sample.vcm",
        ])
        .unwrap();
        let config = VcmConfig::try_from(args).unwrap();

        assert_eq!(config.bam, PathBuf::from("sample.bam"));
        assert_eq!(config.output, PathBuf::from("out/sample.vcm"));
        assert_eq!(config.min_coverage, 0);
        assert_eq!(config.alignment.min_mapq, 60);
        assert_eq!(config.alignment.cell_barcode_tag, "CB");
        assert!(config.alignment.require_barcode);
        assert_eq!(config.scheduler.workers, 4);
        assert_eq!(config.scheduler.unit_size, UnitSize::Fixed(1));
        assert!(config.scheduler.pass_only);
        assert!(!config.remake);
    }

    #[test]
    fn include_failed_disables_pass_filter() {
        let args = VcmArgs::from_iter_safe(&[
            "vcm",
            "s.bam",
            "v.vcf",
            "b.tsv",
            "--include-failed",
            "--adaptive",
            "--threads",
            "2",
        ])
        .unwrap();
        let config = VcmConfig::try_from(args).unwrap();
        assert!(!config.scheduler.pass_only);
        assert_eq!(config.scheduler.unit_size, UnitSize::Adaptive { factor: 4 });
        assert!(config.output.ends_with("s.vcm"));
    }

    #[test]
    fn missing_barcodes_fail_to_parse() {
        assert!(VcmArgs::from_iter_safe(&["vcm", "s.bam", "v.vcf"]).is_err());
    }
}
