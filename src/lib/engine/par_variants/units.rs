use rustc_hash::FxHashMap;

use super::types::{UnitSize, Variant};

/// Number of variants per unit so that `len` variants are split into
/// `workers * factor` roughly equal units.
///
/// Never returns zero.
#[inline]
pub fn calculate_unit_size(workers: usize, len: usize, factor: usize) -> usize {
    let divisor = workers.saturating_mul(factor).max(1);
    len.div_ceil(divisor).max(1)
}

impl UnitSize {
    /// Resolve the unit size for a batch of `len` dispatchable variants.
    pub fn resolve(&self, workers: usize, len: usize) -> usize {
        match *self {
            UnitSize::Fixed(size) => size.max(1),
            UnitSize::Adaptive { factor } => calculate_unit_size(workers, len, factor),
        }
    }
}

/// Variants handed to one worker call, tagged with their dispatch order.
#[derive(Debug)]
pub struct WorkUnit {
    pub seq: usize,
    pub variants: Vec<Variant>,
}

/// Lines produced for one [`WorkUnit`].
#[derive(Debug)]
pub struct CompletedUnit {
    pub seq: usize,
    pub lines: Vec<String>,
}

/// Split one batch into units, numbering them from `first_seq`.
pub fn split_into_units(batch: Vec<Variant>, unit_size: usize, first_seq: usize) -> Vec<WorkUnit> {
    let unit_size = unit_size.max(1);
    let mut units = Vec::with_capacity(batch.len().div_ceil(unit_size));
    let mut current = Vec::with_capacity(unit_size);

    for variant in batch {
        current.push(variant);
        if current.len() == unit_size {
            units.push(WorkUnit {
                seq: first_seq + units.len(),
                variants: std::mem::replace(&mut current, Vec::with_capacity(unit_size)),
            });
        }
    }

    if !current.is_empty() {
        units.push(WorkUnit {
            seq: first_seq + units.len(),
            variants: current,
        });
    }
    units
}

/// Holds completions that arrived ahead of their turn and releases them in
/// sequence order.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    next: usize,
    pending: FxHashMap<usize, T>,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self {
            next: 0,
            pending: FxHashMap::default(),
        }
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seq: usize, item: T) {
        debug_assert!(seq >= self.next, "unit {} was already released", seq);
        self.pending.insert(seq, item);
    }

    /// Next item in sequence order, if it has arrived.
    pub fn pop_ready(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(item)
    }

    /// Number of items released so far.
    #[inline]
    pub fn released(&self) -> usize {
        self.next
    }

    /// Number of items held back.
    #[inline]
    pub fn held(&self) -> usize {
        self.pending.len()
    }
}
