//! Pileup extraction over reduced alignment projections.
//!
//! An [`AlignedRead`] is captured once per fetch from the alignment source and
//! only carries what the consensus and frequency passes need: the cell barcode,
//! the aligned-pairs projection and the query sequence.

pub mod aligned_read;

pub use aligned_read::{base_at, AlignedRead, AlignedPair};
