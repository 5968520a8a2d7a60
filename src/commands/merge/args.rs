use std::path::PathBuf;
use structopt::StructOpt;
use vcmtools_lib::pipeline::merge::MergeConfig;

/// Arguments for the `merge` command.
#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "merge",
    about = "Merge per-cell VFF files into one table of consensus bases"
)]
pub struct MergeArgs {
    /// Folder holding one `.vff` file per cell.
    #[structopt(parse(from_os_str))]
    pub folder: PathBuf,

    /// Output table; `-` writes to stdout and a `.gz` suffix compresses it.
    #[structopt(parse(from_os_str))]
    pub output: PathBuf,

    /// Positions with this coverage or less are reported as `N`.
    #[structopt(long, default_value = "0")]
    pub min_coverage: u32,

    /// Positions whose most frequent base has this count or less are reported as `N`.
    #[structopt(long, default_value = "0")]
    pub min_frequency: u32,

    /// Trust row order instead of checking contig and position across files.
    #[structopt(long)]
    pub lenient: bool,

    /// Compression threads for gzipped output.
    #[structopt(long, short = "t", default_value = "1")]
    pub threads: usize,
}

impl From<&MergeArgs> for MergeConfig {
    fn from(args: &MergeArgs) -> MergeConfig {
        MergeConfig {
            min_coverage: args.min_coverage,
            min_frequency: args.min_frequency,
            verify_alignment: !args.lenient,
        }
    }
}
