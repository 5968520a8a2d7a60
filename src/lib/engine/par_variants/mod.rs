//! Parallel variant processing.
//!
//! The [`ParVariants`] executor reads variants lazily in batches, drops those
//! failing the pass filter, splits each batch into units and fans them out to a
//! fixed pool of workers, each holding its own alignment source. Completed units
//! come back through a crossbeam channel and are written by the caller in
//! dispatch order. Callers implement [`VariantProcessor`] to define per-variant
//! work.

mod scheduler;
mod types;
mod units;

pub use scheduler::{run_serial, ParVariants, RunSummary};
pub use types::{
    AlignmentSource, SchedulerConfig, UnitSize, Variant, VariantProcessor, VariantRecord,
    REORDER_WINDOW_FACTOR, UNIT_FACTOR, UNIT_FACTOR_STR, UNIT_SIZE, UNIT_SIZE_STR, WORKERS,
    WORKERS_STR,
};
pub use units::{calculate_unit_size, split_into_units, ReorderBuffer, WorkUnit};
