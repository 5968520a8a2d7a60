//! vcmtools: per-cell consensus tables from single-cell alignments
//!
//! The library turns an indexed BAM and a set of called variants into compact
//! per-cell tables:
//! 1. Variant Call Matrices, one consensus base per cell and variant
//! 2. Variant Frequency Files, per-base read support for one cell or the whole sample
//! 3. Merged tables built from many frequency files through a 3-bit encoding
//!
//! # Modules
//!
//! - [`core`]: errors, I/O helpers and read filtering
//! - [`engine`]: the parallel variant scheduler and pileup extraction
//! - [`pipeline`]: consensus, frequency, table formats and the merge stage
//! - [`utils`]: re-exports of commonly used `core` helpers

pub mod core;
pub mod engine;
pub mod pipeline;
pub mod utils;
