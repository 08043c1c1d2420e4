//! Flagged formats whose matches are a single 16-bit word.
//!
//! | Format | Header | Flags | Match word |
//! |--------|--------|-------|------------|
//! | IR-LZ | u32 LE size | u16 LE, LSB first, 1 = match | LE `(len - 3) << 11 \| (disp - 1)` |
//! | StingLZ | u32 LE size | u16 BE, MSB first, 1 = match | BE `(disp - 1) << 4 \| (len - 3)` |
//! | Danganronpa 3 | none | u8, LSB first, 1 = literal | LE `(len - 2) << 10 \| (0x400 - disp)` |

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use super::{remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{BitOrder, Endian, FlagLayout, History, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

fn word_price(candidate: Option<&Match>) -> u32 {
    if candidate.is_some() { 17 } else { 9 }
}

fn size_header(size: usize) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(4);
    header.write_u32::<LittleEndian>(size_field(size, u32::MAX as u64)?)?;
    Ok(header)
}

fn read_size(input: &[u8]) -> Result<(usize, &[u8])> {
    let mut cursor = Cursor::new(input);
    let size = cursor.read_u32::<LittleEndian>()? as usize;
    Ok((size, remaining(&cursor)))
}

const IR_STYLE: FlagStyle = FlagStyle::new(
    FlagLayout::new(2, BitOrder::LsbFirst, Endian::Little),
    false,
);

/// IR-LZ constraint set.
pub const IR_LZ_LIMITS: FindLimits = FindLimits::new(3, 0x22, 1, 0x800);

/// IR-LZ.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrLz;

impl LzScheme for IrLz {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[IR_LZ_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        word_price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let header = size_header(input.len())?;
        Ok(encode_flagged(header, IR_STYLE, tokens, |writer, m| {
            let word = ((m.length - 3) << 11 | (m.displacement - 1)) as u16;
            writer.extend_from_slice(&word.to_le_bytes());
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (size, body) = read_size(input)?;
        decode_flagged(body, IR_STYLE, History::with_limit(size), |cursor, history| {
            let word = cursor.read_u16::<LittleEndian>()? as usize;
            history.copy_match((word & 0x7FF) + 1, (word >> 11) + 3)
        })
    }
}

const STING_STYLE: FlagStyle = FlagStyle::new(
    FlagLayout::new(2, BitOrder::MsbFirst, Endian::Big),
    false,
);

/// StingLZ constraint set.
pub const STING_LZ_LIMITS: FindLimits = FindLimits::new(3, 0x12, 1, 0x1000);

/// StingLZ.
#[derive(Debug, Clone, Copy, Default)]
pub struct StingLz;

impl LzScheme for StingLz {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[STING_LZ_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        word_price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let header = size_header(input.len())?;
        Ok(encode_flagged(header, STING_STYLE, tokens, |writer, m| {
            let word = ((m.displacement - 1) << 4 | (m.length - 3)) as u16;
            writer.extend_from_slice(&word.to_be_bytes());
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (size, body) = read_size(input)?;
        decode_flagged(body, STING_STYLE, History::with_limit(size), |cursor, history| {
            let word = cursor.read_u16::<BigEndian>()? as usize;
            history.copy_match((word >> 4) + 1, (word & 0xF) + 3)
        })
    }
}

const DR3_STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_LSB, true);

/// Danganronpa 3 constraint set.
pub const DANGANRONPA3_LIMITS: FindLimits = FindLimits::new(2, 0x41, 1, 0x400);

/// Danganronpa 3. Headerless; decoding runs to the end of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Danganronpa3;

impl LzScheme for Danganronpa3 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[DANGANRONPA3_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        word_price(candidate)
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        Ok(encode_flagged(Vec::new(), DR3_STYLE, tokens, |writer, m| {
            let word = ((m.length - 2) << 10 | (0x400 - m.displacement)) as u16;
            writer.extend_from_slice(&word.to_le_bytes());
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        decode_flagged(input, DR3_STYLE, History::new(), |cursor, history| {
            let word = cursor.read_u16::<LittleEndian>()? as usize;
            history.copy_match(0x400 - (word & 0x3FF), (word >> 10) + 2)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    const SAMPLE: &[u8] = b"abcabcabcabc";

    #[test]
    fn test_ir_lz_stream() {
        let packed = LzCodec(IrLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert_eq!(
            packed,
            [12, 0, 0, 0, 0x08, 0x00, b'a', b'b', b'c', 0x02, 0x30]
        );
        assert_eq!(LzCodec(IrLz).decode(&packed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_sting_lz_stream() {
        let packed = LzCodec(StingLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert_eq!(
            packed,
            [12, 0, 0, 0, 0x10, 0x00, b'a', b'b', b'c', 0x00, 0x26]
        );
        assert_eq!(LzCodec(StingLz).decode(&packed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_danganronpa3_stream() {
        let packed = LzCodec(Danganronpa3)
            .encode(SAMPLE, &CompressOptions::default())
            .unwrap();
        assert_eq!(packed, [0x07, b'a', b'b', b'c', 0xFD, 0x1F]);
        assert_eq!(LzCodec(Danganronpa3).decode(&packed).unwrap(), SAMPLE);
    }

    fn roundtrip<S: LzScheme>(scheme: S, data: &[u8]) -> Vec<u8> {
        let codec = LzCodec(scheme);
        let packed = codec.encode(data, &CompressOptions::default()).unwrap();
        codec.decode(&packed).unwrap()
    }

    #[test]
    fn test_full_window() {
        // Distances up to the window edge must survive the word layouts.
        let mut data: Vec<u8> = (0..0x1000u32).map(|i| (i * 167 % 256 ^ i >> 8) as u8).collect();
        let head = data[..0x40].to_vec();
        data.extend(head);
        assert_eq!(roundtrip(IrLz, &data), data);
        assert_eq!(roundtrip(StingLz, &data), data);
        assert_eq!(roundtrip(Danganronpa3, &data), data);
    }

    #[test]
    fn test_truncated() {
        let packed = LzCodec(IrLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert!(LzCodec(IrLz).decode(&packed[..packed.len() - 1]).is_err());
        assert!(LzCodec(Danganronpa3).decode(&[0x00, 0xFF]).is_err());
    }
}
