//! Raw Deflate (RFC 1951).
//!
//! The encoder runs the shared parser over the 32 KiB window and writes one
//! final block with the fixed Huffman codes, falling back to stored blocks
//! when those come out smaller. The decoder handles all three block types:
//!
//! | BTYPE | Block |
//! |-------|-------|
//! | 00 | stored: aligned `LEN`, `NLEN`, raw bytes |
//! | 01 | fixed Huffman codes |
//! | 10 | dynamic Huffman codes, tables sent up front |
//!
//! Bits are packed LSB first; Huffman codes go out most significant bit
//! first, so the encoder writes them bit-reversed.

use super::slots::{self, MAX_DISTANCE, MAX_LENGTH, MIN_LENGTH, distance_slot, length_slot};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, WriteBytesExt};
use kompression_core::{BitReader, BitWriter, History, KompressionError, Result};
use kompression_huffman::{CanonicalDecoder, Code, canonical_codes};
use kompression_lz::{FindLimits, Match, Token};
use std::io::{Cursor, Read};

/// Deflate constraint set.
pub const DEFLATE_LIMITS: FindLimits = FindLimits::new(MIN_LENGTH, MAX_LENGTH, 1, MAX_DISTANCE);

const END_OF_BLOCK: usize = 256;
const MAX_STORED_BLOCK: usize = 0xFFFF;

/// Order of the code length code lengths in a dynamic block header.
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// All 30 fixed distance codes are 5 bits.
const FIXED_DISTANCE_LENGTHS: [u8; 30] = [5; 30];

/// Fixed literal/length code lengths (RFC 1951 section 3.2.6).
fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

fn reverse_bits(value: u32, length: u8) -> u32 {
    if length == 0 {
        0
    } else {
        value.reverse_bits() >> (32 - length as u32)
    }
}

fn write_code(writer: &mut BitWriter<Vec<u8>>, code: Code) -> Result<()> {
    writer.write_bits(reverse_bits(code.bits as u32, code.length), code.length)
}

/// Size of `size` bytes as stored blocks.
fn stored_len(size: usize) -> usize {
    size + 5 * size.div_ceil(MAX_STORED_BLOCK).max(1)
}

fn write_stored_blocks(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(stored_len(data.len()));
    let mut blocks = data.chunks(MAX_STORED_BLOCK).peekable();
    if blocks.peek().is_none() {
        output.extend_from_slice(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
    }
    while let Some(block) = blocks.next() {
        // BFINAL in bit 0, BTYPE 00, padded to the byte boundary.
        output.push(blocks.peek().is_none() as u8);
        output.write_u16::<LittleEndian>(block.len() as u16)?;
        output.write_u16::<LittleEndian>(!(block.len() as u16))?;
        output.extend_from_slice(block);
    }
    Ok(output)
}

fn write_fixed_block(tokens: &[Token]) -> Result<Vec<u8>> {
    let litlen = canonical_codes(&fixed_litlen_lengths())?;
    let mut writer = BitWriter::new(Vec::new());
    writer.write_bit(true)?;
    writer.write_bits(0b01, 2)?;

    for token in tokens {
        match token {
            Token::Literal(byte) => write_code(&mut writer, litlen[*byte as usize])?,
            Token::Match(m) => {
                let slot = length_slot(m.length);
                write_code(&mut writer, litlen[END_OF_BLOCK + 1 + slot.index])?;
                writer.write_bits(slot.extra, slot.extra_bits)?;
                let slot = distance_slot(m.displacement);
                writer.write_bits(reverse_bits(slot.index as u32, 5), 5)?;
                writer.write_bits(slot.extra, slot.extra_bits)?;
            }
        }
    }
    write_code(&mut writer, litlen[END_OF_BLOCK])?;
    writer.flush()?;
    writer.into_inner()
}

/// Decompress a Deflate stream up to and including its final block.
pub(crate) fn inflate<R: Read>(reader: &mut BitReader<R>) -> Result<Vec<u8>> {
    let mut history = History::new();
    loop {
        let last = reader.read_bit()?;
        match reader.read_bits(2)? {
            0 => inflate_stored(reader, &mut history)?,
            1 => {
                let litlen = CanonicalDecoder::from_code_lengths(&fixed_litlen_lengths())?;
                let distances = CanonicalDecoder::from_code_lengths(&FIXED_DISTANCE_LENGTHS)?;
                inflate_codes(reader, &mut history, &litlen, &distances)?;
            }
            2 => {
                let (litlen, distances) = read_dynamic_tables(reader)?;
                inflate_codes(reader, &mut history, &litlen, &distances)?;
            }
            _ => return Err(KompressionError::invalid_header("reserved block type 3")),
        }
        if last {
            break;
        }
    }
    history.finish()
}

fn inflate_stored<R: Read>(reader: &mut BitReader<R>, history: &mut History) -> Result<()> {
    reader.align_to_byte();
    let len = reader.read_bits(16)?;
    let nlen = reader.read_bits(16)?;
    if len != !nlen & 0xFFFF {
        return Err(KompressionError::malformed(
            reader.bit_position() / 8,
            format!("stored length {len:#06x} does not match its complement {nlen:#06x}"),
        ));
    }
    let mut block = vec![0u8; len as usize];
    reader.read_bytes(&mut block)?;
    history.extend_from_slice(&block)
}

fn read_dynamic_tables<R: Read>(
    reader: &mut BitReader<R>,
) -> Result<(CanonicalDecoder, CanonicalDecoder)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut code_length_lengths = [0u8; 19];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        code_length_lengths[symbol] = reader.read_bits(3)? as u8;
    }
    let code_lengths = CanonicalDecoder::from_code_lengths(&code_length_lengths)?;

    let total = hlit + hdist;
    let mut lengths: Vec<u8> = Vec::with_capacity(total);
    while lengths.len() < total {
        let (value, repeat) = match code_lengths.decode(reader)? {
            symbol @ 0..=15 => (symbol as u8, 1),
            16 => {
                let Some(&previous) = lengths.last() else {
                    return Err(KompressionError::malformed(
                        reader.bit_position() / 8,
                        "repeat code with no previous length",
                    ));
                };
                (previous, reader.read_bits(2)? as usize + 3)
            }
            17 => (0, reader.read_bits(3)? as usize + 3),
            18 => (0, reader.read_bits(7)? as usize + 11),
            _ => return Err(KompressionError::invalid_huffman(reader.bit_position())),
        };
        if lengths.len() + repeat > total {
            return Err(KompressionError::malformed(
                reader.bit_position() / 8,
                "code lengths overflow the alphabets",
            ));
        }
        lengths.extend(std::iter::repeat_n(value, repeat));
    }

    let (litlen, distances) = lengths.split_at(hlit);
    Ok((
        CanonicalDecoder::from_code_lengths(litlen)?,
        CanonicalDecoder::from_code_lengths(distances)?,
    ))
}

fn inflate_codes<R: Read>(
    reader: &mut BitReader<R>,
    history: &mut History,
    litlen: &CanonicalDecoder,
    distances: &CanonicalDecoder,
) -> Result<()> {
    loop {
        let symbol = litlen.decode(reader)? as usize;
        match symbol {
            0..=255 => history.push(symbol as u8)?,
            END_OF_BLOCK => return Ok(()),
            _ => {
                let (base, bits) = slots::length_base(symbol - END_OF_BLOCK - 1)?;
                let length = base + reader.read_bits(bits)? as usize;
                let (base, bits) = slots::distance_base(distances.decode(reader)? as usize)?;
                let distance = base + reader.read_bits(bits)? as usize;
                history.copy_match(distance, length)?;
            }
        }
    }
}

/// Raw Deflate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deflate;

impl LzScheme for Deflate {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[DEFLATE_LIMITS])
    }

    // Half bits: fixed literals take 8 or 9 bits depending on the byte.
    fn price(&self, candidate: Option<&Match>) -> u32 {
        let Some(m) = candidate else {
            return 17;
        };
        let length_code = if length_slot(m.length).index < 23 { 7 } else { 8 };
        2 * (length_code + 5 + slots::extra_cost(m.length, m.displacement))
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let fixed = write_fixed_block(tokens)?;
        if stored_len(input.len()) < fixed.len() {
            write_stored_blocks(input)
        } else {
            Ok(fixed)
        }
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        inflate(&mut BitReader::new(Cursor::new(input)))
    }
}
