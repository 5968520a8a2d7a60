//! Per-base read support for Variant Frequency Files.

use crate::core::error::Result;
use crate::engine::pileup::{base_at, AlignedRead};

/// Counts of A, C, G and T at one position for one cell.
///
/// Deletions and ambiguous bases are not counted anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyVector {
    pub a: u32,
    pub c: u32,
    pub g: u32,
    pub t: u32,
}

impl FrequencyVector {
    pub fn new(a: u32, c: u32, g: u32, t: u32) -> Self {
        Self { a, c, g, t }
    }

    /// Record one observation; `None` is a deletion.
    #[inline]
    pub fn observe(&mut self, base: Option<u8>) {
        match base.map(|b| b.to_ascii_uppercase()) {
            Some(b'A') => self.a += 1,
            Some(b'C') => self.c += 1,
            Some(b'G') => self.g += 1,
            Some(b'T') => self.t += 1,
            _ => {}
        }
    }

    /// Coverage: the sum of the four base counts.
    #[inline]
    pub fn total(&self) -> u32 {
        self.a + self.c + self.g + self.t
    }
}

/// Tally the bases of `reads` at 0-based `position`, optionally for one cell only.
pub fn base_frequencies(
    reads: &[AlignedRead],
    position: i64,
    target: Option<&str>,
) -> Result<FrequencyVector> {
    let mut frequencies = FrequencyVector::default();
    for read in reads {
        if target.is_some_and(|barcode| !read.has_barcode(barcode)) {
            continue;
        }
        frequencies.observe(base_at(read, position)?);
    }
    Ok(frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_base() {
        let reads = vec![
            AlignedRead::contiguous("r1", Some("C1"), 99, b"A"),
            AlignedRead::contiguous("r2", Some("C1"), 98, b"GAT"),
            AlignedRead::contiguous("r3", Some("C1"), 99, b"C"),
        ];
        let freq = base_frequencies(&reads, 99, None).unwrap();
        assert_eq!(freq, FrequencyVector::new(2, 1, 0, 0));
        assert_eq!(freq.total(), 3);
    }

    #[test]
    fn no_reads_gives_zero_vector() {
        let freq = base_frequencies(&[], 5, Some("C1")).unwrap();
        assert_eq!(freq, FrequencyVector::default());
        assert_eq!(freq.total(), 0);
    }

    #[test]
    fn deletions_and_ambiguous_bases_are_not_coverage() {
        let mut freq = FrequencyVector::default();
        freq.observe(None);
        freq.observe(Some(b'N'));
        freq.observe(Some(b't'));
        assert_eq!(freq, FrequencyVector::new(0, 0, 0, 1));
        assert_eq!(freq.total(), 1);
    }

    #[test]
    fn target_cell_filter() {
        let reads = vec![
            AlignedRead::contiguous("r1", Some("C1"), 10, b"G"),
            AlignedRead::contiguous("r2", Some("C2"), 10, b"T"),
            AlignedRead::contiguous("r3", None, 10, b"T"),
        ];
        assert_eq!(
            base_frequencies(&reads, 10, Some("C2")).unwrap(),
            FrequencyVector::new(0, 0, 0, 1)
        );
        assert_eq!(base_frequencies(&reads, 10, None).unwrap().total(), 3);
    }

    #[test]
    fn uncovered_read_fails() {
        let reads = vec![AlignedRead::contiguous("r1", Some("C1"), 10, b"G")];
        assert!(base_frequencies(&reads, 11, None).is_err());
    }
}
