//! Execution engine shared by the `vcm` and `vff` stages.
//!
//! - [`pileup`]: reduced alignment projection and per-position base extraction
//! - [`par_variants`]: the variant-chunk scheduler

pub mod par_variants;
pub mod pileup;

pub use par_variants::{ParVariants, SchedulerConfig, VariantProcessor};
