//! LZSS with variable-length integers.
//!
//! Integers are written as 7-bit groups, most significant first, with the
//! high bit set on every group but the last. The header is three integers:
//! the decompressed size followed by two reserved zeros.
//!
//! The body is a sequence of blocks. A control byte `L << 4 | M` gives the
//! number of literals and matches in the block; a zero nibble means the
//! count follows as an integer (literal count first). The literals come
//! next, then the matches. A match is the integer
//! `(disp - 1) << 4 | min(len - 3, 15)`, followed by `len - 18` when the
//! nibble is saturated.

use crate::codec::{LzConfig, LzScheme};
use byteorder::ReadBytesExt;
use kompression_core::{History, KompressionError, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

/// LZSS-VLC constraint set.
pub const LZSS_VLC_LIMITS: FindLimits = FindLimits::new(3, 0xFFFF, 1, 0x10000);

/// Longest integer accepted by the decoder.
const MAX_GROUPS: usize = 10;

/// Number of bytes `value` takes as an integer.
pub fn vlc_len(value: usize) -> usize {
    let bits = usize::BITS - value.leading_zeros();
    (bits as usize).div_ceil(7).max(1)
}

/// Append `value` as an integer.
pub fn write_vlc(output: &mut Vec<u8>, value: usize) {
    let groups = vlc_len(value);
    for i in (0..groups).rev() {
        let group = (value >> (7 * i)) as u8 & 0x7F;
        output.push(if i > 0 { group | 0x80 } else { group });
    }
}

/// Read an integer.
pub fn read_vlc(cursor: &mut Cursor<&[u8]>) -> Result<usize> {
    let mut value = 0usize;
    for _ in 0..MAX_GROUPS {
        let byte = cursor.read_u8()?;
        value = value
            .checked_mul(0x80)
            .map(|v| v | (byte & 0x7F) as usize)
            .ok_or_else(|| KompressionError::malformed(cursor.position(), "integer overflow"))?;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(KompressionError::malformed(
        cursor.position(),
        "integer longer than ten groups",
    ))
}

fn match_word(m: &Match) -> (usize, Option<usize>) {
    let n = (m.length - 3).min(15);
    let extra = (n == 15).then(|| m.length - 18);
    ((m.displacement - 1) << 4 | n, extra)
}

fn write_count(output: &mut Vec<u8>, count: usize) {
    if !(1..=15).contains(&count) {
        write_vlc(output, count);
    }
}

/// LZSS-VLC.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzssVlc;

impl LzScheme for LzssVlc {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZSS_VLC_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        let Some(m) = candidate else {
            return 8;
        };
        let (word, extra) = match_word(m);
        8 * (vlc_len(word) + extra.map_or(0, vlc_len)) as u32
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        write_vlc(&mut output, input.len());
        write_vlc(&mut output, 0);
        write_vlc(&mut output, 0);

        let mut rest = tokens;
        while !rest.is_empty() {
            let literals = rest
                .iter()
                .take_while(|t| matches!(t, Token::Literal(_)))
                .count();
            let matches = rest[literals..]
                .iter()
                .take_while(|t| matches!(t, Token::Match(_)))
                .count();
            let (block, next) = rest.split_at(literals + matches);

            let nibble = |count: usize| if count <= 15 { count } else { 0 };
            output.push((nibble(literals) << 4 | nibble(matches)) as u8);
            write_count(&mut output, literals);
            write_count(&mut output, matches);

            for token in block {
                match token {
                    Token::Literal(byte) => output.push(*byte),
                    Token::Match(m) => {
                        let (word, extra) = match_word(m);
                        write_vlc(&mut output, word);
                        if let Some(extra) = extra {
                            write_vlc(&mut output, extra);
                        }
                    }
                }
            }
            rest = next;
        }
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_vlc(&mut cursor)?;
        read_vlc(&mut cursor)?;
        read_vlc(&mut cursor)?;

        let mut history = History::with_limit(size);
        while !history.is_full() {
            let control = cursor.read_u8()? as usize;
            let mut count = |nibble: usize| match nibble {
                0 => read_vlc(&mut cursor),
                n => Ok(n),
            };
            let literals = count(control >> 4)?;
            let matches = count(control & 0xF)?;

            for _ in 0..literals {
                history.push(cursor.read_u8()?)?;
            }
            for _ in 0..matches {
                let word = read_vlc(&mut cursor)?;
                let length = match word & 0xF {
                    15 => read_vlc(&mut cursor)?.saturating_add(18),
                    n => n + 3,
                };
                history.copy_match((word >> 4) + 1, length)?;
            }
        }
        history.finish()
    }
}
