//! Symbol layouts: how a byte buffer is split into Huffman symbols.
//!
//! Nintendo's Huffman formats code either whole bytes or 4-bit nibbles. For
//! nibbles the order within a byte is selectable; the low nibble comes first
//! on the DS and GBA, some titles store the high nibble first.

/// Order of the two nibbles of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NibbleOrder {
    /// Low nibble, then high nibble.
    LowFirst,
    /// High nibble, then low nibble.
    HighFirst,
}

/// Width of a symbol and, for nibbles, their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolLayout {
    /// One symbol per byte, alphabet of 256.
    Byte,
    /// Two symbols per byte, alphabet of 16.
    Nibble(NibbleOrder),
}

impl SymbolLayout {
    /// Bits per symbol.
    pub const fn bits(&self) -> u8 {
        match self {
            SymbolLayout::Byte => 8,
            SymbolLayout::Nibble(_) => 4,
        }
    }

    /// Number of distinct symbols.
    pub const fn alphabet_size(&self) -> usize {
        1 << self.bits()
    }

    /// Symbols per input byte.
    pub const fn symbols_per_byte(&self) -> usize {
        match self {
            SymbolLayout::Byte => 1,
            SymbolLayout::Nibble(_) => 2,
        }
    }

    /// Split `data` into symbols.
    pub fn split(&self, data: &[u8]) -> Vec<u16> {
        match self {
            SymbolLayout::Byte => data.iter().map(|&b| b as u16).collect(),
            SymbolLayout::Nibble(order) => data
                .iter()
                .flat_map(|&b| {
                    let (low, high) = ((b & 0x0F) as u16, (b >> 4) as u16);
                    match order {
                        NibbleOrder::LowFirst => [low, high],
                        NibbleOrder::HighFirst => [high, low],
                    }
                })
                .collect(),
        }
    }

    /// Join symbols back into bytes. A trailing odd nibble is dropped.
    pub fn join(&self, symbols: &[u16]) -> Vec<u8> {
        match self {
            SymbolLayout::Byte => symbols.iter().map(|&s| s as u8).collect(),
            SymbolLayout::Nibble(order) => symbols
                .chunks_exact(2)
                .map(|pair| {
                    let (first, second) = (pair[0] as u8 & 0x0F, pair[1] as u8 & 0x0F);
                    match order {
                        NibbleOrder::LowFirst => first | (second << 4),
                        NibbleOrder::HighFirst => (first << 4) | second,
                    }
                })
                .collect(),
        }
    }

    /// Symbol frequencies of `data`.
    pub fn histogram(&self, data: &[u8]) -> Vec<u32> {
        let mut counts = vec![0u32; self.alphabet_size()];
        for symbol in self.split(data) {
            counts[symbol as usize] = counts[symbol as usize].saturating_add(1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_orders() {
        let low = SymbolLayout::Nibble(NibbleOrder::LowFirst);
        let high = SymbolLayout::Nibble(NibbleOrder::HighFirst);
        assert_eq!(low.split(&[0xA5]), vec![0x5, 0xA]);
        assert_eq!(high.split(&[0xA5]), vec![0xA, 0x5]);
        assert_eq!(low.join(&[0x5, 0xA]), vec![0xA5]);
        assert_eq!(high.join(&[0xA, 0x5]), vec![0xA5]);
    }

    #[test]
    fn test_histogram() {
        let counts = SymbolLayout::Byte.histogram(b"aab");
        assert_eq!(counts.len(), 256);
        assert_eq!(counts[b'a' as usize], 2);
        assert_eq!(counts[b'b' as usize], 1);

        let counts = SymbolLayout::Nibble(NibbleOrder::LowFirst).histogram(&[0x11, 0x21]);
        assert_eq!(counts[1], 3);
        assert_eq!(counts[2], 1);
    }
}
