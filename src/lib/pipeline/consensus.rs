//! Consensus calling for the Variant Call Matrix.
//!
//! One call is made per cell and variant from the bases its reads show at the
//! variant position. A deletion at the top of the ranking gives way to the best
//! real base whenever there is one.

use std::fmt;

use crate::core::error::Result;
use crate::engine::pileup::{base_at, AlignedRead};
use crate::pipeline::barcode::BarcodeSet;

/// Symbol written for cells without a usable call.
pub const UNKNOWN: char = 'N';

/// Consensus symbol for one cell at one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusCall {
    Base(u8),
    Unknown,
}

impl ConsensusCall {
    #[inline]
    pub fn as_char(&self) -> char {
        match self {
            ConsensusCall::Base(base) => *base as char,
            ConsensusCall::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for ConsensusCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Most frequent observation among `bases`, where `None` marks a deletion.
///
/// Ties go to the value observed first. Fewer than `min_coverage` observations
/// (deletions included) give [`ConsensusCall::Unknown`].
pub fn most_common_base(bases: &[Option<u8>], min_coverage: usize) -> ConsensusCall {
    if bases.len() < min_coverage {
        return ConsensusCall::Unknown;
    }

    let mut counts: Vec<(Option<u8>, usize)> = Vec::with_capacity(4);
    for base in bases {
        match counts.iter_mut().find(|(value, _)| value == base) {
            Some((_, count)) => *count += 1,
            None => counts.push((*base, 1)),
        }
    }
    // stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    match counts.first() {
        None => ConsensusCall::Unknown,
        Some((Some(base), _)) => ConsensusCall::Base(*base),
        Some((None, _)) => counts
            .get(1)
            .and_then(|(value, _)| *value)
            .map_or(ConsensusCall::Unknown, ConsensusCall::Base),
    }
}

/// One call per barcode, in barcode-set order.
///
/// Each read is resolved once; reads whose barcode is not in the set are ignored.
pub fn call_cells(
    reads: &[AlignedRead],
    position: i64,
    barcodes: &BarcodeSet,
    min_coverage: usize,
) -> Result<Vec<ConsensusCall>> {
    let mut buckets: Vec<Vec<Option<u8>>> = vec![Vec::new(); barcodes.len()];
    for read in reads {
        let Some(id) = read.cell_barcode.as_deref().and_then(|bc| barcodes.id_of(bc)) else {
            continue;
        };
        buckets[id as usize].push(base_at(read, position)?);
    }

    Ok(buckets
        .iter()
        .map(|bases| most_common_base(bases, min_coverage))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::VcmError;

    fn read(name: &str, barcode: &str, start: i64, seq: &[u8]) -> AlignedRead {
        AlignedRead::contiguous(name, Some(barcode), start, seq)
    }

    fn deletion_read(name: &str, barcode: &str, position: i64) -> AlignedRead {
        AlignedRead::new(
            name,
            Some(barcode.to_string()),
            vec![(Some(0), Some(position - 1)), (None, Some(position)), (Some(1), Some(position + 1))],
            b"AC".to_vec(),
        )
    }

    #[test]
    fn majority_base_wins() {
        let bases = [Some(b'A'), Some(b'A'), Some(b'C')];
        assert_eq!(most_common_base(&bases, 0), ConsensusCall::Base(b'A'));
    }

    #[test]
    fn ties_go_to_first_seen() {
        assert_eq!(
            most_common_base(&[Some(b'G'), Some(b'T'), Some(b'T'), Some(b'G')], 0),
            ConsensusCall::Base(b'G')
        );
    }

    #[test]
    fn majority_deletion_yields_second_base() {
        let bases = [None, None, None, Some(b'T')];
        assert_eq!(most_common_base(&bases, 0), ConsensusCall::Base(b'T'));
    }

    #[test]
    fn tied_deletion_seen_first_still_yields_base() {
        assert_eq!(most_common_base(&[None, Some(b'C')], 0), ConsensusCall::Base(b'C'));
    }

    #[test]
    fn deletions_only_is_unknown() {
        assert_eq!(most_common_base(&[None, None], 0), ConsensusCall::Unknown);
    }

    #[test]
    fn no_reads_is_unknown() {
        assert_eq!(most_common_base(&[], 0), ConsensusCall::Unknown);
        assert_eq!(most_common_base(&[], 1), ConsensusCall::Unknown);
    }

    #[test]
    fn coverage_floor_counts_deletions() {
        assert_eq!(most_common_base(&[Some(b'A'), None], 3), ConsensusCall::Unknown);
        assert_eq!(most_common_base(&[Some(b'A'), None], 2), ConsensusCall::Base(b'A'));
    }

    #[test]
    fn never_returns_a_deletion_marker() {
        let patterns: [&[Option<u8>]; 4] = [
            &[None, Some(b'A')],
            &[None, None, Some(b'G'), Some(b'C')],
            &[Some(b'T'), None, None],
            &[None],
        ];
        for bases in patterns {
            let call = most_common_base(bases, 0);
            if bases.iter().any(Option::is_some) {
                assert!(matches!(call, ConsensusCall::Base(_)), "{bases:?}");
            } else {
                assert_eq!(call, ConsensusCall::Unknown);
            }
        }
    }

    #[test]
    fn single_cell_restriction() {
        let reads = vec![
            read("r1", "C1", 98, b"TAA"),
            read("r2", "C1", 99, b"A"),
            read("r3", "C2", 97, b"GGC"),
        ];
        let only_c2 = BarcodeSet::from_vec(vec!["C2".into()]);
        assert_eq!(
            call_cells(&reads, 99, &only_c2, 0).unwrap(),
            vec![ConsensusCall::Base(b'C')]
        );
        let pooled: Vec<_> = reads.iter().map(|r| base_at(r, 99).unwrap()).collect();
        assert_eq!(most_common_base(&pooled, 0), ConsensusCall::Base(b'A'));
        let only_c3 = BarcodeSet::from_vec(vec!["C3".into()]);
        assert_eq!(
            call_cells(&reads, 99, &only_c3, 1).unwrap(),
            vec![ConsensusCall::Unknown]
        );
    }

    #[test]
    fn calls_follow_barcode_order() {
        let barcodes = BarcodeSet::from_vec(vec!["C2".into(), "C1".into(), "C3".into()]);
        let reads = vec![
            read("r1", "C1", 99, b"A"),
            read("r2", "C1", 99, b"A"),
            read("r3", "C1", 99, b"C"),
            deletion_read("r4", "C2", 99),
            read("r5", "C2", 99, b"G"),
            read("r6", "OTHER", 50, b"A"),
        ];
        let calls = call_cells(&reads, 99, &barcodes, 0).unwrap();
        assert_eq!(
            calls,
            vec![ConsensusCall::Base(b'G'), ConsensusCall::Base(b'A'), ConsensusCall::Unknown]
        );
    }

    #[test]
    fn uncovered_read_of_listed_cell_fails() {
        let barcodes = BarcodeSet::from_vec(vec!["C1".into()]);
        let reads = vec![read("r1", "C1", 10, b"AC")];
        let err = call_cells(&reads, 99, &barcodes, 0).unwrap_err();
        assert!(matches!(err, VcmError::PositionNotAligned { .. }));
    }

    #[test]
    fn unknown_renders_as_n() {
        assert_eq!(ConsensusCall::Unknown.to_string(), "N");
        assert_eq!(ConsensusCall::Base(b'T').to_string(), "T");
    }
}
