pub mod concurrency;
pub mod error;
pub mod errors;
pub mod fs;
pub mod io;
pub mod read_filter;

pub mod prelude {
    pub use super::concurrency::{build_rayon_pool, determine_allowed_cpus};
    pub use super::error::{require_positive, Result, VcmError};
    pub use super::errors::is_broken_pipe;
    pub use super::fs::{file_stem_string, is_bgzipped, keep_existing, make_parent_dirs};
    pub use super::io::{get_reader, get_writer, table_writer, OutputWriter};
    pub use super::read_filter::{DefaultReadFilter, ReadFilter};
}
