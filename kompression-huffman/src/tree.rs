//! Frequency-built Huffman trees.
//!
//! The tree is stored in an arena: leaves first in symbol order, then the
//! internal nodes in the order they were merged. The two lightest nodes are
//! merged repeatedly; equal weights are resolved by arena index, so the same
//! histogram always yields the same tree.
//!
//! Codes are root-to-leaf paths: `0` selects the left child (the lighter
//! of the merged pair), `1` the right one. Bits are written MSB-first.

use crate::symbols::SymbolLayout;
use kompression_core::{KompressionError, MsbBitReader, MsbBitWriter, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

/// Deepest code a tree may assign.
pub const MAX_TREE_DEPTH: u8 = 64;

/// A code word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    /// Code bits, right aligned; the first bit sent is the most significant.
    pub bits: u64,
    /// Number of bits.
    pub length: u8,
}

impl Code {
    /// Write the code to an MSB-first stream.
    pub fn write_to(&self, writer: &mut MsbBitWriter) {
        if self.length > 32 {
            writer.write_bits((self.bits >> 32) as u32, self.length - 32);
            writer.write_bits(self.bits as u32, 32);
        } else {
            writer.write_bits(self.bits as u32, self.length);
        }
    }
}

/// A node of a [`HuffmanTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HuffmanNode {
    /// A symbol.
    Leaf(u16),
    /// Arena indices of the `0` and `1` children.
    Internal([usize; 2]),
}

/// A Huffman tree over an alphabet of `0..alphabet_size`.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
    codes: Vec<Option<Code>>,
}

impl HuffmanTree {
    /// Build a tree from per-symbol frequencies.
    ///
    /// Symbols with a zero frequency get no code. The tree always has at
    /// least two leaves: when fewer than two symbols occur, the lowest unused
    /// symbols are added with zero weight, so a single-symbol input still
    /// yields a one-bit code.
    pub fn from_frequencies(frequencies: &[u32]) -> Result<Self> {
        if frequencies.len() < 2 || frequencies.len() > u16::MAX as usize + 1 {
            return Err(KompressionError::configuration(format!(
                "Huffman alphabet of {} symbols is not supported",
                frequencies.len()
            )));
        }

        let mut nodes = Vec::with_capacity(frequencies.len() * 2);
        let mut heap = BinaryHeap::new();
        let mut leaf = |symbol: usize, weight: u64, nodes: &mut Vec<HuffmanNode>| {
            nodes.push(HuffmanNode::Leaf(symbol as u16));
            heap.push(Reverse((weight, nodes.len() - 1)));
        };

        let used = frequencies.iter().filter(|&&f| f > 0).count();
        let padding: Vec<usize> = (0..frequencies.len())
            .filter(|&s| frequencies[s] == 0)
            .take(2usize.saturating_sub(used))
            .collect();
        for (symbol, &frequency) in frequencies.iter().enumerate() {
            if frequency > 0 {
                leaf(symbol, frequency as u64, &mut nodes);
            } else if padding.contains(&symbol) {
                leaf(symbol, 0, &mut nodes);
            }
        }

        while heap.len() > 1 {
            let (Some(Reverse((w0, a))), Some(Reverse((w1, b)))) = (heap.pop(), heap.pop()) else {
                break;
            };
            nodes.push(HuffmanNode::Internal([a, b]));
            heap.push(Reverse((w0 + w1, nodes.len() - 1)));
        }

        let root = nodes.len() - 1;
        let codes = Self::assign_codes(&nodes, root, frequencies.len())?;
        trace!(
            alphabet = frequencies.len(),
            nodes = nodes.len(),
            "built Huffman tree"
        );
        Ok(Self { nodes, root, codes })
    }

    /// Build a tree from the symbol histogram of `data`.
    pub fn from_data(data: &[u8], layout: SymbolLayout) -> Result<Self> {
        Self::from_frequencies(&layout.histogram(data))
    }

    fn assign_codes(
        nodes: &[HuffmanNode],
        root: usize,
        alphabet: usize,
    ) -> Result<Vec<Option<Code>>> {
        let mut codes = vec![None; alphabet];
        let mut stack = vec![(root, Code::default())];
        while let Some((index, code)) = stack.pop() {
            match nodes[index] {
                HuffmanNode::Leaf(symbol) => codes[symbol as usize] = Some(code),
                HuffmanNode::Internal(children) => {
                    if code.length == MAX_TREE_DEPTH {
                        return Err(KompressionError::configuration(format!(
                            "Huffman tree deeper than {MAX_TREE_DEPTH} levels"
                        )));
                    }
                    for (bit, child) in children.into_iter().enumerate() {
                        let next = Code {
                            bits: (code.bits << 1) | bit as u64,
                            length: code.length + 1,
                        };
                        stack.push((child, next));
                    }
                }
            }
        }
        Ok(codes)
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.codes.len()
    }

    /// Arena index of the root.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Node at `index`.
    pub fn node(&self, index: usize) -> HuffmanNode {
        self.nodes[index]
    }

    /// All nodes of the arena.
    pub fn nodes(&self) -> &[HuffmanNode] {
        &self.nodes
    }

    /// Code of `symbol`, if it has one.
    pub fn code(&self, symbol: u16) -> Option<Code> {
        self.codes.get(symbol as usize).copied().flatten()
    }

    /// Code length per symbol, zero for symbols without a code.
    pub fn code_lengths(&self) -> Vec<u8> {
        self.codes
            .iter()
            .map(|c| c.map_or(0, |c| c.length))
            .collect()
    }

    /// Length of the longest code.
    pub fn max_depth(&self) -> u8 {
        self.codes
            .iter()
            .flatten()
            .map(|c| c.length)
            .max()
            .unwrap_or(0)
    }

    /// Write the code of one symbol.
    pub fn encode_symbol(&self, writer: &mut MsbBitWriter, symbol: u16) -> Result<()> {
        let code = self.code(symbol).ok_or_else(|| {
            KompressionError::configuration(format!("symbol {symbol} has no Huffman code"))
        })?;
        code.write_to(writer);
        Ok(())
    }

    /// Read one symbol by walking from the root.
    pub fn decode_symbol(&self, reader: &mut MsbBitReader<'_>) -> Result<u16> {
        let mut index = self.root;
        loop {
            match self.nodes[index] {
                HuffmanNode::Leaf(symbol) => return Ok(symbol),
                HuffmanNode::Internal(children) => {
                    index = children[reader.read_bit()? as usize];
                }
            }
        }
    }

    /// Encode `data` as a packed MSB-first bit string.
    pub fn encode(&self, data: &[u8], layout: SymbolLayout) -> Result<Vec<u8>> {
        let mut writer = MsbBitWriter::new();
        for symbol in layout.split(data) {
            self.encode_symbol(&mut writer, symbol)?;
        }
        Ok(writer.into_vec())
    }

    /// Decode `count` bytes from a bit string written by [`Self::encode`].
    pub fn decode(&self, bits: &[u8], count: usize, layout: SymbolLayout) -> Result<Vec<u8>> {
        let mut reader = MsbBitReader::new(bits);
        let symbols = (0..count * layout.symbols_per_byte())
            .map(|_| self.decode_symbol(&mut reader))
            .collect::<Result<Vec<u16>>>()?;
        Ok(layout.join(&symbols))
    }
}
