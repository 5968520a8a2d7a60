//! Shortcuts to the shared helpers in `crate::core`.

pub use crate::core::concurrency::{build_rayon_pool, determine_allowed_cpus};
pub use crate::core::errors::is_broken_pipe;
pub use crate::core::fs::{file_stem_string, is_bgzipped, keep_existing, make_parent_dirs};
pub use crate::core::io::{get_reader, get_writer, table_writer, OutputWriter};
