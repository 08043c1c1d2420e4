//! Nintendo Huffman (type 0x24 / 0x28).
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┬──────────────────────┐
//! │ N32 header   │ tree table                    │ u32 LE bit words     │
//! │ 0x24 / 0x28  │ size byte, root, node pairs   │ codes MSB-first      │
//! └──────────────┴───────────────────────────────┴──────────────────────┘
//! ```
//!
//! The table's first byte is `table_len / 2 - 1`; the root node sits at
//! address 1 and every internal node's children form a pair at
//! `(address & !1) + offset * 2 + 2`. A node byte holds the 6-bit offset
//! in its low bits, bit 7 set when child 0 is a leaf and bit 6 set when
//! child 1 is. Leaves hold the symbol itself.
//!
//! The 6-bit offset means a child pair must land within 64 pairs of its
//! parent. Pairs are placed one slot at a time: if postponing the most
//! urgent pending pair could make some pair miss its window, that pair goes
//! first; otherwise the pair with the smallest remaining subtree does.

use super::nintendo::{read_header, write_header};
use super::{region, remaining};
use crate::codec::{CompressOptions, Decoder, Encoder};
use kompression_core::{KompressionError, MsbBitReader, Result};
use kompression_huffman::{HuffmanNode, HuffmanTree, NibbleOrder, SymbolLayout};
use std::io::Cursor;
use tracing::trace;

/// Furthest a child pair may sit from its parent's pair.
const MAX_PAIR_OFFSET: usize = 64;

/// Nintendo Huffman codec for one symbol layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NintendoHuffman {
    layout: SymbolLayout,
}

impl NintendoHuffman {
    /// 4-bit symbols, low nibble first.
    pub const HUFFMAN4_LE: Self = Self::new(SymbolLayout::Nibble(NibbleOrder::LowFirst));
    /// 4-bit symbols, high nibble first.
    pub const HUFFMAN4_BE: Self = Self::new(SymbolLayout::Nibble(NibbleOrder::HighFirst));
    /// 8-bit symbols.
    pub const HUFFMAN8: Self = Self::new(SymbolLayout::Byte);

    /// Codec for `layout`.
    pub const fn new(layout: SymbolLayout) -> Self {
        Self { layout }
    }

    /// Symbol layout.
    pub fn layout(&self) -> SymbolLayout {
        self.layout
    }

    fn kind(&self) -> u8 {
        0x20 | self.layout.bits()
    }

    /// Tree table and bit words, without the size header.
    pub(crate) fn encode_body(&self, input: &[u8]) -> Result<Vec<u8>> {
        let tree = HuffmanTree::from_data(input, self.layout)?;
        let mut body = layout_table(&tree)?;
        let mut bits = tree.encode(input, self.layout)?;
        bits.resize(bits.len().next_multiple_of(4), 0);
        for word in bits.chunks_exact(4) {
            body.extend(word.iter().rev());
        }
        Ok(body)
    }

    /// Decode `size` bytes from a body written by [`Self::encode_body`].
    pub(crate) fn decode_body(&self, body: &[u8], size: usize) -> Result<Vec<u8>> {
        let Some(&size_byte) = body.first() else {
            return Err(KompressionError::unexpected_eof(1));
        };
        let table = region(body, 0, (size_byte as usize + 1) * 2)?;
        let words = &body[table.len()..];

        let mut bits = Vec::with_capacity(words.len());
        for word in words.chunks_exact(4) {
            bits.extend(word.iter().rev());
        }
        let mut reader = MsbBitReader::new(&bits);

        // Every symbol costs at least one bit.
        let count = size.saturating_mul(self.layout.symbols_per_byte());
        let mut symbols = Vec::with_capacity(count.min(bits.len() * 8));
        for _ in 0..count {
            symbols.push(decode_symbol(table, &mut reader)?);
        }
        Ok(self.layout.join(&symbols))
    }
}

impl Encoder for NintendoHuffman {
    fn encode(&self, input: &[u8], _options: &CompressOptions) -> Result<Vec<u8>> {
        let mut output = write_header(self.kind(), input.len())?;
        output.extend(self.encode_body(input)?);
        Ok(output)
    }
}

impl Decoder for NintendoHuffman {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_header(&mut cursor, self.kind())?;
        self.decode_body(remaining(&cursor), size)
    }
}

fn decode_symbol(table: &[u8], reader: &mut MsbBitReader<'_>) -> Result<u16> {
    let mut address = 1;
    loop {
        let node = table[address];
        let bit = reader.read_bit()? as usize;
        let child = (address & !1) + (node & 0x3F) as usize * 2 + 2 + bit;
        let value = *table.get(child).ok_or_else(|| {
            KompressionError::malformed(child as u64, "Huffman node points past the tree table")
        })?;
        if node & (0x80 >> bit) != 0 {
            return Ok(value as u16);
        }
        address = child;
    }
}

/// A node whose child pair still needs a slot.
#[derive(Debug, Clone, Copy)]
struct Pending {
    node: usize,
    address: usize,
    deadline: usize,
}

/// Serialize `tree` into a table, size byte included.
fn layout_table(tree: &HuffmanTree) -> Result<Vec<u8>> {
    let nodes = tree.nodes();

    // Children precede their parents in the arena.
    let mut internal = vec![0usize; nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        if let HuffmanNode::Internal([a, b]) = node {
            internal[index] = 1 + internal[*a] + internal[*b];
        }
    }
    let pairs = internal[tree.root()];

    let mut table = vec![0u8; (2 * (pairs + 1)).next_multiple_of(4)];
    table[0] = (table.len() / 2 - 1) as u8;

    let mut pending = vec![Pending {
        node: tree.root(),
        address: 1,
        deadline: MAX_PAIR_OFFSET,
    }];
    for slot in 1..=pairs {
        pending.sort_by_key(|p| p.deadline);
        let mut forced = false;
        for (k, p) in pending.iter().enumerate() {
            if p.deadline < slot + k {
                return Err(KompressionError::configuration(
                    "Huffman tree does not fit the 6-bit node offsets",
                ));
            }
            forced |= p.deadline == slot + k;
        }
        let pick = if forced {
            0
        } else {
            (0..pending.len())
                .min_by_key(|&i| (internal[pending[i].node], pending[i].deadline))
                .unwrap_or(0)
        };
        let job = pending.remove(pick);

        let HuffmanNode::Internal(children) = nodes[job.node] else {
            continue;
        };
        let mut byte = (slot - job.address / 2 - 1) as u8;
        for (bit, child) in children.into_iter().enumerate() {
            let address = 2 * slot + bit;
            match nodes[child] {
                HuffmanNode::Leaf(symbol) => {
                    byte |= 0x80 >> bit;
                    table[address] = symbol as u8;
                }
                HuffmanNode::Internal(_) => pending.push(Pending {
                    node: child,
                    address,
                    deadline: slot + MAX_PAIR_OFFSET,
                }),
            }
        }
        table[job.address] = byte;
    }

    trace!(pairs, table = table.len(), "laid out Huffman table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec: NintendoHuffman, data: &[u8]) -> Vec<u8> {
        let packed = codec.encode(data, &CompressOptions::default()).unwrap();
        assert_eq!(codec.decode(&packed).unwrap(), data);
        packed
    }

    #[test]
    fn test_balanced_byte_tree() {
        let data: Vec<u8> = (0..=255u8).cycle().take(0x2000).collect();
        let packed = roundtrip(NintendoHuffman::HUFFMAN8, &data);
        // 8-bit codes, 256-entry tree.
        assert_eq!(packed.len(), 4 + 512 + 0x2000);
    }

    #[test]
    fn test_deep_tree() {
        // Fibonacci weights give a maximally unbalanced tree.
        let mut weights = vec![1usize, 1];
        while weights.len() < 20 {
            let n = weights.len();
            weights.push(weights[n - 1] + weights[n - 2]);
        }
        let data: Vec<u8> = weights
            .iter()
            .enumerate()
            .flat_map(|(symbol, &w)| std::iter::repeat_n(symbol as u8, w))
            .collect();
        roundtrip(NintendoHuffman::HUFFMAN8, &data);
    }

    #[test]
    fn test_nibble_orders() {
        let data = b"\x12\x12\x12\x34\xFF\x00";
        let le = roundtrip(NintendoHuffman::HUFFMAN4_LE, data);
        let be = roundtrip(NintendoHuffman::HUFFMAN4_BE, data);
        assert_eq!(le[0], 0x24);
        assert_eq!(be[0], 0x24);
        assert_ne!(le, be);
        assert!(NintendoHuffman::HUFFMAN8.decode(&le).is_err());
    }

    #[test]
    fn test_empty_and_single() {
        roundtrip(NintendoHuffman::HUFFMAN8, b"");
        roundtrip(NintendoHuffman::HUFFMAN4_LE, b"");
        roundtrip(NintendoHuffman::HUFFMAN8, b"x");
        roundtrip(NintendoHuffman::HUFFMAN8, &[0xAA; 100]);
    }

    #[test]
    fn test_table_header() {
        let packed = roundtrip(NintendoHuffman::HUFFMAN8, b"aab");
        // Two leaves: size byte, root, one pair.
        assert_eq!(packed[4], 1);
        assert_eq!(packed[5], 0xC0);
    }

    #[test]
    fn test_truncated_words() {
        let packed = roundtrip(NintendoHuffman::HUFFMAN8, b"hello world");
        let cut = &packed[..packed.len() - 4];
        assert!(NintendoHuffman::HUFFMAN8.decode(cut).is_err());
    }

    #[test]
    fn test_declared_size_beyond_data() {
        // Extended header claiming 4 GiB, a two-leaf tree and one bit word.
        let packed = [0x28, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0xC0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            NintendoHuffman::HUFFMAN8.decode(&packed),
            Err(KompressionError::UnexpectedEof { .. })
        ));
    }
}
