use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use vcmtools_lib::core::error::VcmError;
use vcmtools_lib::engine::par_variants::{
    SchedulerConfig, UnitSize, UNIT_FACTOR_STR, UNIT_SIZE_STR, WORKERS_STR,
};
use vcmtools_lib::pipeline::sources::ensure_bam_index;
use vcmtools_lib::utils;

/// Scheduler flags shared by the `vcm` and `vff` subcommands.
#[derive(Debug, Clone, StructOpt)]
pub struct SchedulerArgs {
    /// Number of worker threads, each holding its own BAM handle.
    #[structopt(long, short = "t", default_value = WORKERS_STR.as_str())]
    pub threads: usize,

    /// Variants read from the VCF per dispatch round. Reads the whole file when absent.
    #[structopt(long)]
    pub batch_size: Option<usize>,

    /// Variants handed to a worker at once.
    #[structopt(long, short = "u", default_value = UNIT_SIZE_STR.as_str())]
    pub unit_size: usize,

    /// Split every batch into `threads * factor` equally sized units instead of `--unit-size`.
    #[structopt(long)]
    pub adaptive: bool,

    /// Units per worker and batch in `--adaptive` mode.
    #[structopt(long, default_value = UNIT_FACTOR_STR.as_str())]
    pub factor: usize,

    /// Log a progress message per batch or barcode.
    #[structopt(long)]
    pub message: bool,
}

impl SchedulerArgs {
    /// Validated scheduler configuration; zero counts are rejected.
    pub fn to_config(&self, pass_only: bool) -> Result<SchedulerConfig, VcmError> {
        let unit_size = if self.adaptive {
            UnitSize::Adaptive {
                factor: self.factor,
            }
        } else {
            UnitSize::Fixed(self.unit_size)
        };
        SchedulerConfig {
            workers: utils::determine_allowed_cpus(self.threads)?,
            batch_size: self.batch_size,
            unit_size,
            pass_only,
            message: self.message,
        }
        .validate()
    }
}

/// `<cwd>/<bam stem>.vcm`
pub fn default_vcm_output(bam: &Path) -> Result<PathBuf, VcmError> {
    let stem = utils::file_stem_string(bam)
        .ok_or_else(|| VcmError::config(format!("Cannot derive a name from {}", bam.display())))?;
    Ok(env::current_dir()?.join(format!("{}.vcm", stem)))
}

/// The BAM path with its extension removed.
pub fn default_vff_folder(bam: &Path) -> PathBuf {
    bam.with_extension("")
}

/// Build the BAM index next to `bam` when it is missing.
pub fn prepare_bam(bam: &Path, threads: usize) -> Result<()> {
    ensure_bam_index(bam, threads)
        .with_context(|| format!("Failed to index {}", bam.display()))
}
