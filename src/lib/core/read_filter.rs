//! Read filtering primitives applied while projecting alignment records.
//!
//! This module exposes the [`ReadFilter`] trait along with the default
//! mapping-quality based filter.

use rust_htslib::bam::record::Record;

/// A trait for filtering reads based on various criteria.
///
/// Implementations should return `true` if the read passes the filter and
/// `false` otherwise.
pub trait ReadFilter {
    /// Filter a read based on various criteria.
    fn filter_read(&self, read: &Record) -> bool;
}

/// A straightforward read filter based on mapping quality.
#[derive(Debug, Clone, Copy)]
pub struct DefaultReadFilter {
    /// The read's mapping quality must be greater than or equal to this value to pass.
    min_mapq: u8,
}

impl DefaultReadFilter {
    /// Create a new [`DefaultReadFilter`] with the specified criteria.
    pub fn new(min_mapq: u8) -> Self {
        Self { min_mapq }
    }
}

impl ReadFilter for DefaultReadFilter {
    #[inline(always)]
    fn filter_read(&self, read: &Record) -> bool {
        read.mapq() >= self.min_mapq
    }
}
