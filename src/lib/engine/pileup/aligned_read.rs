use log::error;
use std::fmt;

use crate::core::error::{Result, VcmError};

/// One entry of the aligned-pairs projection: `(query offset, reference position)`.
///
/// Insertions and soft clips have no reference position; deletions and reference
/// skips have no query offset.
pub type AlignedPair = (Option<usize>, Option<i64>);

/// Reduced, owned projection of an alignment record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedRead {
    /// Read name, kept for diagnostics.
    pub qname: String,
    /// Cell barcode tag value, if the record carried one.
    pub cell_barcode: Option<String>,
    /// Ordered aligned pairs, 0-based.
    pub aligned_pairs: Vec<AlignedPair>,
    /// Query bases as stored in the record.
    pub query_sequence: Vec<u8>,
}

impl AlignedRead {
    pub fn new(
        qname: impl Into<String>,
        cell_barcode: Option<String>,
        aligned_pairs: Vec<AlignedPair>,
        query_sequence: Vec<u8>,
    ) -> Self {
        Self {
            qname: qname.into(),
            cell_barcode,
            aligned_pairs,
            query_sequence,
        }
    }

    #[inline]
    pub fn has_barcode(&self, barcode: &str) -> bool {
        self.cell_barcode.as_deref() == Some(barcode)
    }
}

#[cfg(test)]
impl AlignedRead {
    /// Build a gap-free read whose first base aligns to `start`.
    pub(crate) fn contiguous(
        qname: impl Into<String>,
        cell_barcode: Option<&str>,
        start: i64,
        sequence: &[u8],
    ) -> Self {
        let aligned_pairs = (0..sequence.len())
            .map(|offset| (Some(offset), Some(start + offset as i64)))
            .collect();
        Self::new(
            qname,
            cell_barcode.map(str::to_string),
            aligned_pairs,
            sequence.to_vec(),
        )
    }
}

impl fmt::Display for AlignedRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.aligned_pairs.iter().find_map(|(_, r)| *r);
        let last = self.aligned_pairs.iter().rev().find_map(|(_, r)| *r);
        writeln!(f, "Read (name, barcode, from, to):")?;
        writeln!(
            f,
            "{} {} {} {}",
            self.qname,
            self.cell_barcode.as_deref().unwrap_or("-"),
            first.map_or_else(|| "-".to_string(), |p| p.to_string()),
            last.map_or_else(|| "-".to_string(), |p| (p + 1).to_string()),
        )?;
        writeln!(f, "Pairs: {:?}", self.aligned_pairs)?;
        write!(f, "Sequence: {}", String::from_utf8_lossy(&self.query_sequence))
    }
}

/// Base aligned to the 0-based reference `position`.
///
/// Returns `Ok(None)` when the position falls in a deletion or reference skip,
/// and [`VcmError::PositionNotAligned`] when the read does not cover it at all.
pub fn base_at(read: &AlignedRead, position: i64) -> Result<Option<u8>> {
    for &(query, reference) in &read.aligned_pairs {
        if reference != Some(position) {
            continue;
        }
        return match query {
            Some(offset) => match read.query_sequence.get(offset) {
                Some(base) => Ok(Some(*base)),
                None => Err(not_aligned(read, position)),
            },
            None => Ok(None),
        };
    }

    Err(not_aligned(read, position))
}

fn not_aligned(read: &AlignedRead, position: i64) -> VcmError {
    error!("Position {} was not found in the read:\n{}", position, read);
    VcmError::PositionNotAligned {
        position,
        read: read.qname.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spliced_read() -> AlignedRead {
        // 2S 3M 2D 2M 1I 1M starting at reference 100
        AlignedRead::new(
            "r1",
            Some("AAAC".to_string()),
            vec![
                (Some(0), None),
                (Some(1), None),
                (Some(2), Some(100)),
                (Some(3), Some(101)),
                (Some(4), Some(102)),
                (None, Some(103)),
                (None, Some(104)),
                (Some(5), Some(105)),
                (Some(6), Some(106)),
                (Some(7), None),
                (Some(8), Some(107)),
            ],
            b"NNACGTAGC".to_vec(),
        )
    }

    #[test]
    fn matched_position_returns_query_base() {
        let read = spliced_read();
        assert_eq!(base_at(&read, 100).unwrap(), Some(b'A'));
        assert_eq!(base_at(&read, 106).unwrap(), Some(b'A'));
        assert_eq!(base_at(&read, 107).unwrap(), Some(b'C'));
    }

    #[test]
    fn deletion_is_no_base() {
        let read = spliced_read();
        assert_eq!(base_at(&read, 103).unwrap(), None);
        assert_eq!(base_at(&read, 104).unwrap(), None);
    }

    #[test]
    fn uncovered_position_is_an_error() {
        let read = spliced_read();
        let err = base_at(&read, 99).unwrap_err();
        match err {
            VcmError::PositionNotAligned { position, read } => {
                assert_eq!(position, 99);
                assert_eq!(read, "r1");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(base_at(&read, 108).is_err());
    }

    #[test]
    fn contiguous_reads_cover_their_span() {
        let read = AlignedRead::contiguous("r2", Some("GGTT"), 98, b"TTA");
        assert_eq!(base_at(&read, 98).unwrap(), Some(b'T'));
        assert_eq!(base_at(&read, 100).unwrap(), Some(b'A'));
        assert!(read.has_barcode("GGTT"));
        assert!(!read.has_barcode("AAAC"));
    }

    #[test]
    fn display_carries_read_context() {
        let text = spliced_read().to_string();
        assert!(text.contains("r1 AAAC 100 108"));
        assert!(text.contains("Sequence: NNACGTAGC"));
    }
}
