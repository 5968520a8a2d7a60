use log::info;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

/// Create parent directories for a path when missing.
pub fn make_parent_dirs<P: AsRef<Path>>(path: P) -> io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Detect whether a path uses a gzip/BGZF-compatible extension.
pub fn is_bgzipped<P: AsRef<Path>>(path: P) -> bool {
    matches!(
        path.as_ref().extension().unwrap_or_else(|| OsStr::new("")),
        ext if ext == "gz" || ext == "gzip" || ext == "bgzf"
    )
}

/// Returns `true` when `path` already exists and must be left untouched.
pub fn keep_existing<P: AsRef<Path>>(path: P, remake: bool) -> bool {
    let path = path.as_ref();
    if !remake && path.is_file() {
        info!("File {} already exists.", path.display());
        true
    } else {
        false
    }
}

/// File name without its final extension, used as a cell or sample label.
pub fn file_stem_string<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
