mod args;

use anyhow::{Context, Result};
use log::info;
use vcmtools_lib::pipeline::merge::{merge_folder, MergeConfig};
use vcmtools_lib::utils;

pub use args::MergeArgs;

/// Entry point for the `merge` command.
pub fn run_merge(args: MergeArgs) -> Result<()> {
    let config = MergeConfig::from(&args);
    info!("Running vcmtools merge on {:?}", args.folder);

    if args.output.as_os_str() != "-" {
        utils::make_parent_dirs(&args.output)?;
    }
    let threads = utils::determine_allowed_cpus(args.threads)?;
    let mut writer = utils::table_writer(&args.output, threads)?;
    let rows = merge_folder(&args.folder, &config, &mut writer)
        .with_context(|| format!("Failed to merge {}", args.folder.display()))?;
    writer
        .finish()
        .with_context(|| format!("Failed to finish {:?}", args.output))?;

    info!("Merged {} rows -> {:?}", rows, args.output);
    Ok(())
}
