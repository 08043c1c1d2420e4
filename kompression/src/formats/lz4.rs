//! Headerless LZ4 blocks.
//!
//! A block is a run of sequences, each a token byte `LLLL MMMM`, the
//! literal count extension, the literals, a u16 LE offset and the match
//! length extension. A nibble of 15 means extension bytes follow, each
//! added to the count, until one is below 255. Match lengths are
//! `M + 4`. The last sequence carries literals only (possibly none), and
//! the decoder stops once it has copied them.
//!
//! Reference decoders also require the last 5 bytes of a block to be
//! literals and the last match to start at least 12 bytes before the end,
//! so blocks under 13 bytes are stored as literals. The encoder follows
//! both rules; the decoder does not insist on them.

use super::region;
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt};
use kompression_core::{History, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

/// LZ4 constraint set.
pub const LZ4_LIMITS: FindLimits = FindLimits::new(4, 0xFFFF, 1, 0xFFFF);

const MIN_MATCH: usize = 4;

/// Bytes at the end of a block that must be literals.
pub const LAST_LITERALS: usize = 5;

/// A match must start at least this many bytes before the end of a block.
pub const MATCH_START_MARGIN: usize = 12;

fn write_extension(output: &mut Vec<u8>, mut n: usize) {
    while n >= 0xFF {
        output.push(0xFF);
        n -= 0xFF;
    }
    output.push(n as u8);
}

fn read_count(cursor: &mut Cursor<&[u8]>, nibble: usize) -> Result<usize> {
    let mut count = nibble;
    if nibble == 15 {
        loop {
            let byte = cursor.read_u8()?;
            count += byte as usize;
            if byte != 0xFF {
                break;
            }
        }
    }
    Ok(count)
}

fn write_sequence(output: &mut Vec<u8>, literals: &[u8], m: Option<&Match>) {
    let match_len = m.map_or(0, |m| m.length - MIN_MATCH);
    output.push((literals.len().min(15) << 4 | match_len.min(15)) as u8);
    if literals.len() >= 15 {
        write_extension(output, literals.len() - 15);
    }
    output.extend_from_slice(literals);
    if let Some(m) = m {
        output.extend_from_slice(&(m.displacement as u16).to_le_bytes());
        if match_len >= 15 {
            write_extension(output, match_len - 15);
        }
    }
}

/// Headerless LZ4.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Headerless;

impl LzScheme for Lz4Headerless {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ4_LIMITS]).with_tail(LAST_LITERALS, MATCH_START_MARGIN)
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 8,
            Some(m) if m.length < MIN_MATCH + 15 => 24,
            Some(m) => 24 + 8 * ((m.length - MIN_MATCH - 15) / 0xFF + 1) as u32,
        }
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut literals = Vec::new();
        for token in tokens {
            match token {
                Token::Literal(byte) => literals.push(*byte),
                Token::Match(m) => {
                    write_sequence(&mut output, &literals, Some(m));
                    literals.clear();
                }
            }
        }
        write_sequence(&mut output, &literals, None);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let mut history = History::new();
        loop {
            let token = cursor.read_u8()? as usize;
            let count = read_count(&mut cursor, token >> 4)?;
            let start = cursor.position() as usize;
            history.extend_from_slice(region(input, start, count)?)?;
            cursor.set_position((start + count) as u64);

            if cursor.position() as usize >= input.len() {
                break;
            }
            let offset = cursor.read_u16::<LittleEndian>()? as usize;
            let length = read_count(&mut cursor, token & 0xF)? + MIN_MATCH;
            history.copy_match(offset, length)?;
        }
        history.finish()
    }
}
