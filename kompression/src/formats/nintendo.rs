//! Nintendo LZ10, LZ11 and the LZ40/LZ60 variants.
//!
//! All four start with a 4-byte header: the type byte in the low byte and
//! the decompressed size in the upper 24 bits, little-endian. Sizes that do
//! not fit (and the empty buffer) use the extended form: a zero size field
//! followed by a full 32-bit size.
//!
//! ```text
//! LZ10 match:  LLLL DDDD DDDD DDDD              len 3..=0x12, disp 1..=0x1000
//! LZ11 match:  LLLL DDDD DDDD DDDD              len 3..=0x10
//!              0000 LLLL LLLL DDDD ...          len 0x11..=0x110
//!              0001 LLLL LLLL LLLL LLLL DDDD .. len 0x111..=0x10110
//! LZ40 match:  u16 LE disp << 4 | n             n = len, or 0/1 for an
//!                                               extra u8/u16 length
//! ```
//!
//! Flags are MSB-first bytes; a set bit marks a match.

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use super::{remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{FlagLayout, History, KompressionError, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

const STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_MSB, false);

/// Write a Nintendo size header.
pub(crate) fn write_header(kind: u8, size: usize) -> Result<Vec<u8>> {
    let size = size_field(size, u32::MAX as u64)?;
    let mut header = Vec::with_capacity(8);
    if size > 0 && size <= 0xFF_FFFF {
        header.write_u32::<LittleEndian>(kind as u32 | size << 8)?;
    } else {
        header.write_u32::<LittleEndian>(kind as u32)?;
        header.write_u32::<LittleEndian>(size)?;
    }
    Ok(header)
}

/// Read a Nintendo size header, returning the decompressed size.
pub(crate) fn read_header(cursor: &mut Cursor<&[u8]>, kind: u8) -> Result<usize> {
    let word = cursor.read_u32::<LittleEndian>()?;
    let found = (word & 0xFF) as u8;
    if found != kind {
        return Err(KompressionError::invalid_magic([kind], [found]));
    }
    match word >> 8 {
        0 => Ok(cursor.read_u32::<LittleEndian>()? as usize),
        size => Ok(size as usize),
    }
}

/// LZ10 constraint set.
pub const LZ10_LIMITS: FindLimits = FindLimits::new(3, 0x12, 1, 0x1000);

/// Nintendo LZ10 (GBA/DS BIOS LZ77).
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz10;

impl Lz10 {
    pub(crate) fn write_body(output: Vec<u8>, tokens: &[Token]) -> Vec<u8> {
        encode_flagged(output, STYLE, tokens, |writer, m| {
            let word = ((m.length - 3) << 12 | (m.displacement - 1)) as u16;
            writer.extend_from_slice(&word.to_be_bytes());
        })
    }

    pub(crate) fn read_body(body: &[u8], size: usize) -> Result<Vec<u8>> {
        decode_flagged(body, STYLE, History::with_limit(size), |cursor, history| {
            let word = cursor.read_u16::<BigEndian>()? as usize;
            history.copy_match((word & 0xFFF) + 1, (word >> 12) + 3)
        })
    }
}

impl LzScheme for Lz10 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ10_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        if candidate.is_some() { 17 } else { 9 }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        Ok(Self::write_body(write_header(0x10, input.len())?, tokens))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_header(&mut cursor, 0x10)?;
        Self::read_body(remaining(&cursor), size)
    }
}

/// LZ11 constraint set.
pub const LZ11_LIMITS: FindLimits = FindLimits::new(3, 0x10110, 1, 0x1000);

/// Nintendo LZ11 (DS extended LZ77).
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz11;

impl LzScheme for Lz11 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ11_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) if m.length <= 0x10 => 17,
            Some(m) if m.length <= 0x110 => 25,
            Some(_) => 33,
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let header = write_header(0x11, input.len())?;
        Ok(encode_flagged(header, STYLE, tokens, |writer, m| {
            let disp = (m.displacement - 1) as u32;
            let len = m.length as u32;
            let bytes: Vec<u8> = if len <= 0x10 {
                let word = (len - 1) << 12 | disp;
                word.to_be_bytes()[2..].to_vec()
            } else if len <= 0x110 {
                let word = (len - 0x11) << 12 | disp;
                word.to_be_bytes()[1..].to_vec()
            } else {
                let word = 1 << 28 | (len - 0x111) << 12 | disp;
                word.to_be_bytes().to_vec()
            };
            writer.extend_from_slice(&bytes);
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_header(&mut cursor, 0x11)?;
        let body = remaining(&cursor);
        decode_flagged(body, STYLE, History::with_limit(size), |cursor, history| {
            let b0 = cursor.read_u8()? as usize;
            let (length, disp) = match b0 >> 4 {
                0 => {
                    let rest = cursor.read_u16::<BigEndian>()? as usize;
                    (((b0 & 0xF) << 4 | rest >> 12) + 0x11, rest & 0xFFF)
                }
                1 => {
                    let rest = cursor.read_u24::<BigEndian>()? as usize;
                    (((b0 & 0xF) << 12 | rest >> 12) + 0x111, rest & 0xFFF)
                }
                indicator => {
                    let b1 = cursor.read_u8()? as usize;
                    (indicator + 1, (b0 & 0xF) << 8 | b1)
                }
            };
            history.copy_match(disp + 1, length)
        })
    }
}

/// LZ40/LZ60 constraint set.
pub const LZ40_LIMITS: FindLimits = FindLimits::new(3, 0x1010F, 1, 0xFFF);

/// LZ40-style format parameterised by its type byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz40Family<const KIND: u8>;

/// LZ40 (type byte 0x40).
pub type Lz40 = Lz40Family<0x40>;

/// LZ60 (type byte 0x60), LZ40 under another name.
pub type Lz60 = Lz40Family<0x60>;

impl<const KIND: u8> LzScheme for Lz40Family<KIND> {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ40_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) if m.length <= 0xF => 17,
            Some(m) if m.length <= 0x10F => 25,
            Some(_) => 33,
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let header = write_header(KIND, input.len())?;
        Ok(encode_flagged(header, STYLE, tokens, |writer, m| {
            let disp = (m.displacement << 4) as u16;
            match m.length {
                len @ 3..=0xF => writer.extend_from_slice(&(disp | len as u16).to_le_bytes()),
                len @ 0x10..=0x10F => {
                    writer.extend_from_slice(&disp.to_le_bytes());
                    writer.push((len - 0x10) as u8);
                }
                len => {
                    writer.extend_from_slice(&(disp | 1).to_le_bytes());
                    writer.extend_from_slice(&((len - 0x110) as u16).to_le_bytes());
                }
            }
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_header(&mut cursor, KIND)?;
        let body = remaining(&cursor);
        decode_flagged(body, STYLE, History::with_limit(size), |cursor, history| {
            let word = cursor.read_u16::<LittleEndian>()? as usize;
            let length = match word & 0xF {
                0 => cursor.read_u8()? as usize + 0x10,
                1 => cursor.read_u16::<LittleEndian>()? as usize + 0x110,
                n => n,
            };
            history.copy_match(word >> 4, length)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    #[test]
    fn test_lz10_abab_bytes() {
        let packed = LzCodec(Lz10)
            .encode(b"ABABABABAB", &CompressOptions::default())
            .unwrap();
        assert_eq!(packed, [0x10, 0x0A, 0, 0, 0x20, b'A', b'B', 0x50, 0x01]);
        assert_eq!(LzCodec(Lz10).decode(&packed).unwrap(), b"ABABABABAB");
    }

    #[test]
    fn test_constraint_sets() {
        assert_eq!(Lz10.configure().limits, [LZ10_LIMITS]);
        assert_eq!(Lz11.configure().limits, [LZ11_LIMITS]);
        assert_eq!(Lz40::default().configure().limits, [LZ40_LIMITS]);
        assert_eq!(Lz60::default().configure().limits, [LZ40_LIMITS]);
        assert_eq!(LZ11_LIMITS.max_length, 0x10110);
        assert_eq!(LZ40_LIMITS.max_displacement, 0xFFF);
    }

    #[test]
    fn test_lz10_rejects_wrong_type() {
        let err = LzCodec(Lz10).decode(&[0x11, 0x01, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, KompressionError::InvalidMagic { .. }));
    }

    #[test]
    fn test_lz10_distance_before_start() {
        // One literal, then a match reaching two bytes back.
        let err = LzCodec(Lz10)
            .decode(&[0x10, 0x05, 0, 0, 0x40, b'x', 0x00, 0x01])
            .unwrap_err();
        assert!(matches!(err, KompressionError::InvalidDistance { .. }));
    }

    #[test]
    fn test_lz11_three_byte_form() {
        let packed = [0x11, 0x21, 0, 0, 0x40, b'a', 0x00, 0xF0, 0x00];
        let data = vec![b'a'; 0x21];
        assert_eq!(LzCodec(Lz11).decode(&packed).unwrap(), data);
        assert_eq!(
            LzCodec(Lz11)
                .encode(&data, &CompressOptions::default())
                .unwrap(),
            packed
        );
    }

    #[test]
    fn test_lz11_long_match() {
        let data = vec![7u8; 0x3000];
        let packed = LzCodec(Lz11)
            .encode(&data, &CompressOptions::default())
            .unwrap();
        assert!(packed.len() < 16);
        assert_eq!(LzCodec(Lz11).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_lz40_lengths() {
        let mut data = b"0123456789".to_vec();
        data.extend_from_slice(&[b'z'; 0x400]);
        data.extend_from_slice(b"0123456789");
        let options = CompressOptions::default();
        let packed = LzCodec(Lz40::default()).encode(&data, &options).unwrap();
        assert_eq!(packed[0], 0x40);
        assert_eq!(LzCodec(Lz40::default()).decode(&packed).unwrap(), data);

        let packed = LzCodec(Lz60::default()).encode(&data, &options).unwrap();
        assert_eq!(packed[0], 0x60);
        assert!(LzCodec(Lz40::default()).decode(&packed).is_err());
    }

    #[test]
    fn test_extended_header() {
        let header = write_header(0x10, 0x0100_0000).unwrap();
        assert_eq!(header, [0x10, 0, 0, 0, 0, 0, 0, 1]);
        let mut cursor = Cursor::new(&header[..]);
        assert_eq!(read_header(&mut cursor, 0x10).unwrap(), 0x0100_0000);
        assert_eq!(write_header(0x10, 0).unwrap().len(), 8);
    }

    #[test]
    fn test_truncated_body() {
        assert!(LzCodec(Lz10).decode(&[0x10, 0x08, 0, 0, 0x00, b'a']).is_err());
    }
}
