//! Taiko no Tatsujin LZ80 and LZ81.
//!
//! LZ80 is a byte-oriented format with three match tiers, selected by the
//! top two bits of the code byte:
//!
//! ```text
//! 00cccccc                    c literals follow (c = 0 ends the stream)
//! 01LLDDDD                    len L + 2,  disp D + 1      (2..=5,    1..=0x10)
//! 10LLLLDD DDDDDDDD           len L + 3,  disp D + 1      (3..=0x12, 1..=0x400)
//! 11LLLLLL LDDDDDDD DDDDDDDD  len L + 4,  disp D + 1      (4..=0x83, 1..=0x8000)
//! ```
//!
//! LZ81 is an LZ/Huffman hybrid: after a u32 LE size, an MSB-first bit
//! stream carries three code-length tables (256 literals, 29 length slots,
//! 30 distance slots, six bits per entry) and then the tokens. A `0` bit
//! introduces a literal code; a `1` bit a length slot code with its extra
//! bits followed by a distance slot code with its extra bits, using the
//! Deflate slot tables.

use super::slots::{
    self, DISTANCE_BASE, LENGTH_BASE, MAX_DISTANCE, MAX_LENGTH, MIN_LENGTH, distance_slot,
    length_slot,
};
use super::{remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{History, KompressionError, MsbBitReader, MsbBitWriter, Result};
use kompression_huffman::{CanonicalDecoder, Code, HuffmanTree, canonical_codes};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

/// Longest literal run of one LZ80 code byte.
const MAX_LITERAL_RUN: usize = 0x3F;

/// LZ80 match tiers, cheapest first.
pub const LZ80_LIMITS: [FindLimits; 3] = [
    FindLimits::new(2, 5, 1, 0x10),
    FindLimits::new(3, 0x12, 1, 0x400),
    FindLimits::new(4, 0x83, 1, 0x8000),
];

fn lz80_tier(m: &Match) -> Option<usize> {
    LZ80_LIMITS
        .iter()
        .position(|limits| limits.accepts(m.displacement, m.length))
}

/// Taiko LZ80.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaikoLz80;

impl LzScheme for TaikoLz80 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&LZ80_LIMITS)
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate.map(lz80_tier) {
            None => 9,
            Some(Some(tier)) => 8 * (tier as u32 + 1),
            Some(None) => u32::MAX / 4,
        }
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut literals: Vec<u8> = Vec::new();
        let flush = |output: &mut Vec<u8>, literals: &mut Vec<u8>| {
            for run in literals.chunks(MAX_LITERAL_RUN) {
                output.push(run.len() as u8);
                output.extend_from_slice(run);
            }
            literals.clear();
        };

        for token in tokens {
            let m = match token {
                Token::Literal(byte) => {
                    literals.push(*byte);
                    continue;
                }
                Token::Match(m) => m,
            };
            flush(&mut output, &mut literals);

            let disp = m.displacement - 1;
            match lz80_tier(m) {
                Some(0) => output.push(0x40 | ((m.length - 2) << 4 | disp) as u8),
                Some(1) => {
                    output.push(0x80 | ((m.length - 3) << 2 | disp >> 8) as u8);
                    output.push(disp as u8);
                }
                Some(_) => {
                    let len = m.length - 4;
                    output.push(0xC0 | (len >> 1) as u8);
                    output.push(((len & 1) << 7 | disp >> 8) as u8);
                    output.push(disp as u8);
                }
                None => {
                    return Err(KompressionError::configuration(format!(
                        "match of {} at distance {} has no LZ80 encoding",
                        m.length, m.displacement
                    )));
                }
            }
        }
        flush(&mut output, &mut literals);
        output.push(0x00);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let mut history = History::new();
        while (cursor.position() as usize) < input.len() {
            let code = cursor.read_u8()? as usize;
            let (length, disp) = match code >> 6 {
                0 if code == 0 => break,
                0 => {
                    for _ in 0..code {
                        history.push(cursor.read_u8()?)?;
                    }
                    continue;
                }
                1 => ((code >> 4 & 3) + 2, code & 0xF),
                2 => {
                    let lo = cursor.read_u8()? as usize;
                    ((code >> 2 & 0xF) + 3, (code & 3) << 8 | lo)
                }
                _ => {
                    let mid = cursor.read_u8()? as usize;
                    let lo = cursor.read_u8()? as usize;
                    (((code & 0x3F) << 1 | mid >> 7) + 4, (mid & 0x7F) << 8 | lo)
                }
            };
            history.copy_match(disp + 1, length)?;
        }
        history.finish()
    }
}

/// Taiko LZ81 constraint set.
pub const LZ81_LIMITS: FindLimits = FindLimits::new(MIN_LENGTH, MAX_LENGTH, 1, MAX_DISTANCE);

/// Bits per transmitted code length.
const CODE_LENGTH_BITS: u8 = 6;

/// Taiko LZ81.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaikoLz81;

/// Code lengths and canonical codes of one alphabet.
fn build_codes(frequencies: &[u32]) -> Result<(Vec<u8>, Vec<Code>)> {
    let lengths = HuffmanTree::from_frequencies(frequencies)?.code_lengths();
    if lengths.iter().any(|&l| l >= 1 << CODE_LENGTH_BITS) {
        return Err(KompressionError::configuration(
            "Huffman code too long for a six-bit length field",
        ));
    }
    let codes = canonical_codes(&lengths)?;
    Ok((lengths, codes))
}

impl LzScheme for TaikoLz81 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ81_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) => 13 + slots::extra_cost(m.length, m.displacement),
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut literal_freq = vec![0u32; 256];
        let mut length_freq = vec![0u32; LENGTH_BASE.len()];
        let mut distance_freq = vec![0u32; DISTANCE_BASE.len()];
        for token in tokens {
            match token {
                Token::Literal(byte) => literal_freq[*byte as usize] += 1,
                Token::Match(m) => {
                    length_freq[length_slot(m.length).index] += 1;
                    distance_freq[distance_slot(m.displacement).index] += 1;
                }
            }
        }

        let (literal_lengths, literal_codes) = build_codes(&literal_freq)?;
        let (length_lengths, length_codes) = build_codes(&length_freq)?;
        let (distance_lengths, distance_codes) = build_codes(&distance_freq)?;

        let mut writer = MsbBitWriter::new();
        for &length in literal_lengths
            .iter()
            .chain(&length_lengths)
            .chain(&distance_lengths)
        {
            writer.write_bits(length as u32, CODE_LENGTH_BITS);
        }

        for token in tokens {
            match token {
                Token::Literal(byte) => {
                    writer.write_bit(false);
                    literal_codes[*byte as usize].write_to(&mut writer);
                }
                Token::Match(m) => {
                    writer.write_bit(true);
                    let slot = length_slot(m.length);
                    length_codes[slot.index].write_to(&mut writer);
                    writer.write_bits(slot.extra, slot.extra_bits);
                    let slot = distance_slot(m.displacement);
                    distance_codes[slot.index].write_to(&mut writer);
                    writer.write_bits(slot.extra, slot.extra_bits);
                }
            }
        }

        let mut output = Vec::new();
        output.write_u32::<LittleEndian>(size_field(input.len(), u32::MAX as u64)?)?;
        output.extend(writer.into_vec());
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let mut reader = MsbBitReader::new(remaining(&cursor));

        let mut read_table = |count: usize| -> Result<CanonicalDecoder> {
            let lengths = (0..count)
                .map(|_| reader.read_bits(CODE_LENGTH_BITS).map(|l| l as u8))
                .collect::<Result<Vec<u8>>>()?;
            CanonicalDecoder::from_code_lengths(&lengths)
        };
        let literals = read_table(256)?;
        let lengths = read_table(LENGTH_BASE.len())?;
        let distances = read_table(DISTANCE_BASE.len())?;

        let mut history = History::with_limit(size);
        while !history.is_full() {
            if !reader.read_bit()? {
                history.push(literals.decode_msb(&mut reader)? as u8)?;
                continue;
            }
            let (base, bits) = slots::length_base(lengths.decode_msb(&mut reader)? as usize)?;
            let length = base + reader.read_bits(bits)? as usize;
            let (base, bits) = slots::distance_base(distances.decode_msb(&mut reader)? as usize)?;
            let distance = base + reader.read_bits(bits)? as usize;
            history.copy_match(distance, length)?;
        }
        history.finish()
    }
}
