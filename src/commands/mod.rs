pub mod common;
pub mod merge;
pub mod vcm;
pub mod vff;

pub use merge::{run_merge, MergeArgs};
pub use vcm::{run_vcm, VcmArgs};
pub use vff::{run_vff, VffArgs};
