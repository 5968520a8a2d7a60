//! Error types for the vcmtools library

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("htslib error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("Table parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Position {position} was not found in the alignment of read {read}")]
    PositionNotAligned { position: i64, read: String },

    #[error("Malformed row at {path:?}:{line}: expected {expected} fields, got {found}")]
    MalformedTableRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Misaligned row at {path:?}:{line}: expected {expected}, got {found}")]
    MisalignedTableRow {
        path: PathBuf,
        line: u64,
        expected: String,
        found: String,
    },

    #[error("Invalid value in {path:?}:{line}: {field}")]
    InvalidTableValue {
        path: PathBuf,
        line: u64,
        field: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Worker thread panicked: {0}")]
    WorkerPanicked(String),
}

pub type Result<T> = std::result::Result<T, VcmError>;

impl VcmError {
    /// Shorthand for [`VcmError::Configuration`].
    pub fn config<S: Into<String>>(message: S) -> Self {
        VcmError::Configuration(message.into())
    }
}

/// Reject a zero value for a parameter that must be strictly positive.
pub fn require_positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(VcmError::config(format!(
            "{} must be a strictly positive integer, got {}",
            name, value
        )))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        let err = require_positive("threads", 0).unwrap_err();
        assert!(matches!(err, VcmError::Configuration(_)));
        assert!(err.to_string().contains("threads"));
    }

    #[test]
    fn positive_values_pass_through() {
        assert_eq!(require_positive("factor", 4).unwrap(), 4);
    }
}
