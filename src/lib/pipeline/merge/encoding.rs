//! Dense 3-bit packing of consensus symbol sequences.

use bitvec::prelude::*;
use std::fmt;

/// Bits used per packed symbol.
pub const SYMBOL_BITS: usize = 3;

/// Consensus symbols of the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    A,
    C,
    T,
    G,
    N,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [Symbol::A, Symbol::C, Symbol::T, Symbol::G, Symbol::N];

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Symbol::A => 0b000,
            Symbol::C => 0b001,
            Symbol::T => 0b010,
            Symbol::G => 0b011,
            Symbol::N => 0b100,
        }
    }

    /// Unused codes decode to `N`.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match code {
            0b000 => Symbol::A,
            0b001 => Symbol::C,
            0b010 => Symbol::T,
            0b011 => Symbol::G,
            _ => Symbol::N,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::C => 'C',
            Symbol::T => 'T',
            Symbol::G => 'G',
            Symbol::N => 'N',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Append-only symbol sequence stored at [`SYMBOL_BITS`] bits per symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSequence {
    bits: BitVec<u8, Msb0>,
}

impl EncodedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(symbols: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(symbols * SYMBOL_BITS),
        }
    }

    pub fn encode<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        let mut sequence = Self::new();
        sequence.extend(symbols);
        sequence
    }

    #[inline]
    pub fn push(&mut self, symbol: Symbol) {
        let code = symbol.code();
        for shift in (0..SYMBOL_BITS).rev() {
            self.bits.push((code >> shift) & 1 == 1);
        }
    }

    /// Number of symbols stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len() / SYMBOL_BITS
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Packed size in bytes.
    pub fn byte_len(&self) -> usize {
        self.bits.as_raw_slice().len()
    }

    /// Lazily decode the sequence, one symbol per step.
    pub fn symbols(&self) -> Symbols<'_> {
        Symbols {
            chunks: self.bits.chunks_exact(SYMBOL_BITS),
        }
    }
}

impl Extend<Symbol> for EncodedSequence {
    fn extend<I: IntoIterator<Item = Symbol>>(&mut self, iter: I) {
        for symbol in iter {
            self.push(symbol);
        }
    }
}

impl FromIterator<Symbol> for EncodedSequence {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self::encode(iter)
    }
}

/// Decoding iterator returned by [`EncodedSequence::symbols`].
pub struct Symbols<'a> {
    chunks: bitvec::slice::ChunksExact<'a, u8, Msb0>,
}

impl Iterator for Symbols<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        self.chunks
            .next()
            .map(|chunk| Symbol::from_code(chunk.load_be::<u8>()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Symbols<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn symbol() -> impl Strategy<Value = Symbol> {
        prop::sample::select(Symbol::ALL.to_vec())
    }

    #[test]
    fn codes_are_three_bits_msb_first() {
        let sequence = EncodedSequence::encode([Symbol::C, Symbol::N, Symbol::G]);
        // 001 100 011 -> 0011_0001 1000_0000
        assert_eq!(sequence.bits.as_raw_slice(), &[0b0011_0001, 0b1000_0000]);
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.byte_len(), 2);
    }

    #[test]
    fn unused_codes_decode_as_unknown() {
        for code in 0b101..=0b111 {
            assert_eq!(Symbol::from_code(code), Symbol::N);
        }
    }

    #[test]
    fn empty_and_single_symbol_sequences() {
        let empty = EncodedSequence::new();
        assert!(empty.is_empty());
        assert_eq!(empty.symbols().count(), 0);

        let single = EncodedSequence::encode([Symbol::T]);
        assert_eq!(single.symbols().collect::<Vec<_>>(), vec![Symbol::T]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn decoding_restores_long_sequences(symbols in prop::collection::vec(symbol(), 10_000)) {
            let sequence: EncodedSequence = symbols.iter().copied().collect();
            prop_assert_eq!(sequence.len(), symbols.len());
            prop_assert_eq!(sequence.symbols().collect::<Vec<_>>(), symbols);
        }
    }

    proptest! {
        #[test]
        fn decoding_restores_any_sequence(symbols in prop::collection::vec(symbol(), 0..64)) {
            let sequence = EncodedSequence::encode(symbols.iter().copied());
            prop_assert_eq!(sequence.symbols().len(), symbols.len());
            prop_assert_eq!(sequence.symbols().collect::<Vec<_>>(), symbols);
        }
    }
}
