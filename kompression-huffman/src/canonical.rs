//! Canonical Huffman codes.
//!
//! A canonical code is fully determined by its code lengths: codes of the
//! same length are consecutive integers assigned in symbol order, and
//! shorter codes precede longer ones (RFC 1951, section 3.2.2). Deflate and
//! the hybrid LZ formats transmit only the lengths.

use crate::tree::{Code, MAX_TREE_DEPTH};
use kompression_core::{BitReader, KompressionError, MsbBitReader, Result};
use std::io::Read;

/// Number of codes of each length, checking the lengths form a prefix code.
fn length_counts(lengths: &[u8]) -> Result<Vec<u64>> {
    let max_length = lengths.iter().copied().max().unwrap_or(0);
    if max_length > MAX_TREE_DEPTH {
        return Err(KompressionError::invalid_header(format!(
            "code length {max_length} exceeds maximum {MAX_TREE_DEPTH}"
        )));
    }

    let mut counts = vec![0u64; max_length as usize + 1];
    for &length in lengths.iter().filter(|&&l| l > 0) {
        counts[length as usize] += 1;
    }

    // Kraft inequality, one level at a time.
    let mut left: i128 = 1;
    for &count in counts.iter().skip(1) {
        left = (left << 1) - count as i128;
        if left < 0 {
            return Err(KompressionError::invalid_header(
                "over-subscribed Huffman code lengths",
            ));
        }
    }
    Ok(counts)
}

/// Assign canonical codes to `lengths`; unused symbols get an empty code.
pub fn canonical_codes(lengths: &[u8]) -> Result<Vec<Code>> {
    let counts = length_counts(lengths)?;

    let mut next = vec![0u64; counts.len()];
    let mut code = 0u64;
    for length in 1..counts.len() {
        code = (code + counts[length - 1]) << 1;
        next[length] = code;
    }

    Ok(lengths
        .iter()
        .map(|&length| {
            if length == 0 {
                return Code::default();
            }
            let bits = next[length as usize];
            next[length as usize] += 1;
            Code { bits, length }
        })
        .collect())
}

/// Decoder for a canonical code given by its lengths.
#[derive(Debug, Clone)]
pub struct CanonicalDecoder {
    /// Codes per length.
    counts: Vec<u64>,
    /// Symbols ordered by (length, symbol).
    symbols: Vec<u16>,
}

impl CanonicalDecoder {
    /// Build a decoder. Incomplete codes are accepted; an all-zero length set
    /// builds a decoder that rejects every input.
    pub fn from_code_lengths(lengths: &[u8]) -> Result<Self> {
        let counts = length_counts(lengths)?;
        let mut symbols: Vec<u16> = (0..lengths.len())
            .filter(|&s| lengths[s] > 0)
            .map(|s| s as u16)
            .collect();
        symbols.sort_by_key(|&s| lengths[s as usize]);
        Ok(Self { counts, symbols })
    }

    /// Longest code length.
    pub fn max_length(&self) -> usize {
        self.counts.len().saturating_sub(1)
    }

    fn walk(&self, mut next_bit: impl FnMut() -> Result<u64>) -> Result<Option<u16>> {
        let mut code = 0u64;
        let mut first = 0u64;
        let mut index = 0usize;
        for &count in self.counts.iter().skip(1) {
            code |= next_bit()?;
            if code - first < count {
                return Ok(Some(self.symbols[index + (code - first) as usize]));
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }
        Ok(None)
    }

    /// Decode one symbol from an LSB-first stream (Deflate packing: code
    /// bits arrive most significant first).
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let symbol = self.walk(|| Ok(reader.read_bits(1)? as u64))?;
        symbol.ok_or_else(|| KompressionError::invalid_huffman(reader.bit_position()))
    }

    /// Decode one symbol from an MSB-first stream.
    pub fn decode_msb(&self, reader: &mut MsbBitReader<'_>) -> Result<u16> {
        let symbol = self.walk(|| Ok(reader.read_bit()? as u64))?;
        symbol.ok_or_else(|| KompressionError::invalid_huffman(reader.bits_read()))
    }
}
