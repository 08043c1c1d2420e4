//! LZE.
//!
//! `"Le"` and a u32 LE size, then 2-bit codes packed four to a flag byte
//! (LSB first), each followed by its payload:
//!
//! | Code | Payload | Meaning |
//! |------|---------|---------|
//! | 0 | u16 LE `(disp - 5) << 4 \| (len - 3)` | long match, len 3..=0x12, disp 5..=0x1004 |
//! | 1 | u8 `(len - 2) << 2 \| (disp - 1)` | short match, len 2..=0x41, disp 1..=4 |
//! | 2 | one byte | literal |
//! | 3 | three bytes | literals |

use super::{expect_magic, remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{FlagLayout, FlagReader, FlagWriter, History, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::{Cursor, Read};

/// LZE match tiers: short, then long.
pub const LZE_LIMITS: [FindLimits; 2] = [
    FindLimits::new(2, 0x41, 1, 4),
    FindLimits::new(3, 0x12, 5, 0x1004),
];

const LONG: u32 = 0;
const SHORT: u32 = 1;
const LITERAL: u32 = 2;
const LITERALS: u32 = 3;

/// LZE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lze;

impl LzScheme for Lze {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&LZE_LIMITS)
    }

    // Thirds of a bit, so a literal in a group of three is priced exactly.
    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 26,
            Some(m) if m.displacement <= 4 => 30,
            Some(_) => 54,
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut header = b"Le".to_vec();
        header.write_u32::<LittleEndian>(size_field(input.len(), u32::MAX as u64)?)?;
        let mut writer = FlagWriter::with_output(FlagLayout::BYTE_LSB, header);

        let mut literals = Vec::new();
        let flush = |writer: &mut FlagWriter, literals: &mut Vec<u8>| {
            let mut groups = literals.chunks_exact(3);
            for group in &mut groups {
                writer.write_flags(LITERALS, 2);
                writer.extend_from_slice(group);
            }
            for &byte in groups.remainder() {
                writer.write_flags(LITERAL, 2);
                writer.push(byte);
            }
            literals.clear();
        };

        for token in tokens {
            match token {
                Token::Literal(byte) => literals.push(*byte),
                Token::Match(m) => {
                    flush(&mut writer, &mut literals);
                    if m.displacement <= 4 {
                        writer.write_flags(SHORT, 2);
                        writer.push(((m.length - 2) << 2 | (m.displacement - 1)) as u8);
                    } else {
                        writer.write_flags(LONG, 2);
                        let word = ((m.displacement - 5) << 4 | (m.length - 3)) as u16;
                        writer.extend_from_slice(&word.to_le_bytes());
                    }
                }
            }
        }
        flush(&mut writer, &mut literals);
        Ok(writer.finish())
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        expect_magic(&mut cursor, b"Le")?;
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let mut body = Cursor::new(remaining(&cursor));

        let mut flags = FlagReader::new(FlagLayout::BYTE_LSB);
        let mut history = History::with_limit(size);
        while !history.is_full() {
            match flags.read_flags(&mut body, 2)? {
                LONG => {
                    let word = body.read_u16::<LittleEndian>()? as usize;
                    history.copy_match((word >> 4) + 5, (word & 0xF) + 3)?;
                }
                SHORT => {
                    let byte = body.read_u8()? as usize;
                    history.copy_match((byte & 3) + 1, (byte >> 2) + 2)?;
                }
                LITERAL => history.push(body.read_u8()?)?,
                _ => {
                    let mut group = [0u8; 3];
                    body.read_exact(&mut group)?;
                    history.extend_from_slice(&group)?;
                }
            }
        }
        history.finish()
    }
}
