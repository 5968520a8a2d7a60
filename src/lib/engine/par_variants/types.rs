use lazy_static::lazy_static;
use smartstring::{LazyCompact, SmartString};
use std::fmt;

use crate::core::error::{require_positive, Result};
use crate::engine::pileup::AlignedRead;

/// Default number of worker threads.
pub const WORKERS: usize = 4;

/// Default number of variants handed to a worker per scheduling hop.
pub const UNIT_SIZE: usize = 1;

/// Default number of units each worker receives per batch in adaptive mode.
pub const UNIT_FACTOR: usize = 4;

/// Completed units the writer may hold back per worker while waiting for an
/// earlier unit. Bounds the reorder buffer to `workers * REORDER_WINDOW_FACTOR`.
pub const REORDER_WINDOW_FACTOR: usize = 4;

lazy_static! {
    /// [`WORKERS`] as a string.
    pub static ref WORKERS_STR: String = WORKERS.to_string();
    /// [`UNIT_SIZE`] as a string.
    pub static ref UNIT_SIZE_STR: String = UNIT_SIZE.to_string();
    /// [`UNIT_FACTOR`] as a string.
    pub static ref UNIT_FACTOR_STR: String = UNIT_FACTOR.to_string();
}

/// A candidate position read from the variant source.
///
/// Owns all of its data so it can be handed to any worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub contig: SmartString<LazyCompact>,
    /// 1-based position, as displayed in output tables.
    pub pos: i64,
    /// 0-based, half-open start.
    pub start: i64,
    /// 0-based, half-open stop.
    pub stop: i64,
    pub reference: String,
}

impl Variant {
    /// Build a variant from its 0-based start and reference allele.
    pub fn new(contig: &str, start: i64, reference: &str) -> Self {
        Self {
            contig: SmartString::from(contig),
            pos: start + 1,
            start,
            stop: start + reference.len().max(1) as i64,
            reference: reference.to_string(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variant (contig, start, stop, position, ref):")?;
        write!(
            f,
            "{} {} {} {} {}",
            self.contig, self.start, self.stop, self.pos, self.reference
        )
    }
}

/// A variant together with its pass/fail status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub variant: Variant,
    /// `true` when the record's FILTER column contains `PASS`.
    pub passed: bool,
}

impl VariantRecord {
    pub fn new(variant: Variant, passed: bool) -> Self {
        Self { variant, passed }
    }
}

/// Read-only access to aligned reads, one instance per worker.
pub trait AlignmentSource {
    /// Reads overlapping the 0-based, half-open interval `[start, stop)`.
    fn fetch(&mut self, contig: &str, start: i64, stop: i64) -> Result<Vec<AlignedRead>>;
}

/// Turns the pileup of one variant into one output line.
pub trait VariantProcessor: Sync {
    /// Produce the table line for `variant`, newline included.
    fn process_variant(&self, variant: &Variant, reads: &[AlignedRead]) -> Result<String>;
}

/// How many variants a worker processes per scheduling hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSize {
    Fixed(usize),
    /// Split each batch into `workers * factor` roughly equal units.
    Adaptive { factor: usize },
}

/// Scheduler knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub workers: usize,
    /// Variants materialised per dispatch round; `None` reads the whole source.
    pub batch_size: Option<usize>,
    pub unit_size: UnitSize,
    /// Drop variants whose FILTER is not `PASS` before dispatch.
    pub pass_only: bool,
    /// Log a progress message per batch.
    pub message: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: WORKERS,
            batch_size: None,
            unit_size: UnitSize::Fixed(UNIT_SIZE),
            pass_only: true,
            message: false,
        }
    }
}

impl SchedulerConfig {
    /// Check that every count is strictly positive.
    pub fn validate(self) -> Result<Self> {
        require_positive("workers", self.workers)?;
        if let Some(batch_size) = self.batch_size {
            require_positive("batch size", batch_size)?;
        }
        match self.unit_size {
            UnitSize::Fixed(size) => require_positive("unit size", size)?,
            UnitSize::Adaptive { factor } => require_positive("factor", factor)?,
        };
        Ok(self)
    }

    #[inline]
    pub fn reorder_window(&self) -> usize {
        self.workers.saturating_mul(REORDER_WINDOW_FACTOR).max(1)
    }
}
