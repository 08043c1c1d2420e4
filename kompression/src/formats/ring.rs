//! Okumura-style ring-buffer LZSS.
//!
//! The decoder keeps a zero-filled ring (4 KiB, written from 0xFEE, for
//! most variants) and matches address it by absolute ring position rather
//! than by distance. The engine sees this as a pre-buffer of zeros the size
//! of the ring: any displacement up to the ring size is encodable, and
//! matches at the start of the input may copy the initial zeros.
//!
//! Flags are bytes read LSB-first with 1 marking a literal. A match is two
//! bytes, `pos & 0xFF` and `(pos >> 8) << length_bits | (len - 3)`.
//!
//! | Format | Header | Ring |
//! |--------|--------|------|
//! | LZSS | `"SSZL"`, u32 0, u32 body len, u32 size (LE) | 0x1000 @ 0xFEE |
//! | Tales of 01 | u8 0x01, u32 body len, u32 size (LE) | 0x1000 @ 0xFEE |
//! | Tales of 03 | u8 0x03, as above; length nibble 0xF is a run | 0x1000 @ 0xFEE |
//! | IECP | `"IECP"`, u32 size (LE) | 0x1000 @ 0xFEE |
//! | LZ-ECD | `"ECD\x01"`, u32 0, u32 body len, u32 size (BE) | 0x400 @ 0x3BE |
//!
//! A Tales of 03 run is `count - 0x13`, `0x0F`, then the byte to repeat.
//! An `"ECD\x00"` buffer holds its data uncompressed.

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use super::{expect_magic, region, remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{FlagLayout, History, KompressionError, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

const STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_LSB, true);

/// Shortest Tales of 03 run.
const RUN_MIN: usize = 0x13;

/// Ring geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    /// Ring size in bytes, a power of two.
    pub size: usize,
    /// Initial write position.
    pub start: usize,
    /// Bits of the second match byte holding `len - 3`.
    pub length_bits: u8,
}

impl Ring {
    /// The classic 4 KiB ring.
    pub const OKUMURA: Self = Self {
        size: 0x1000,
        start: 0xFEE,
        length_bits: 4,
    };

    /// The 1 KiB ring of LZ-ECD.
    pub const ECD: Self = Self {
        size: 0x400,
        start: 0x3BE,
        length_bits: 6,
    };

    fn mask(&self) -> usize {
        self.size - 1
    }
}

/// Container variants sharing the ring encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingFormat {
    /// `SSZL` LZSS.
    Lzss,
    /// Tales of compression type 1.
    TalesOf01,
    /// Tales of compression type 3, with runs.
    TalesOf03,
    /// IECP.
    Iecp,
    /// LZ-ECD.
    LzEcd,
}

static OKUMURA_LIMITS: [FindLimits; 1] = [FindLimits::new(3, 0x12, 1, 0x1000)];
static TALES_OF_03_LIMITS: [FindLimits; 2] = [
    FindLimits::new(3, 0x11, 1, 0x1000),
    FindLimits::new(RUN_MIN, 0x112, 1, 1),
];
static ECD_LIMITS: [FindLimits; 1] = [FindLimits::new(3, 0x42, 1, 0x400)];

/// Ring-buffer LZSS in one of its containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingLzss {
    format: RingFormat,
}

impl RingLzss {
    /// `SSZL` LZSS.
    pub const LZSS: Self = Self::new(RingFormat::Lzss);
    /// Tales of 01.
    pub const TALES_OF_01: Self = Self::new(RingFormat::TalesOf01);
    /// Tales of 03.
    pub const TALES_OF_03: Self = Self::new(RingFormat::TalesOf03);
    /// IECP.
    pub const IECP: Self = Self::new(RingFormat::Iecp);
    /// LZ-ECD.
    pub const LZ_ECD: Self = Self::new(RingFormat::LzEcd);

    /// Codec for `format`.
    pub const fn new(format: RingFormat) -> Self {
        Self { format }
    }

    /// Container variant.
    pub fn format(&self) -> RingFormat {
        self.format
    }

    /// Ring geometry of the variant.
    pub fn ring(&self) -> Ring {
        match self.format {
            RingFormat::LzEcd => Ring::ECD,
            _ => Ring::OKUMURA,
        }
    }

    fn has_runs(&self) -> bool {
        self.format == RingFormat::TalesOf03
    }

    fn write_header(&self, size: usize, body_len: usize) -> Result<Vec<u8>> {
        let size = size_field(size, u32::MAX as u64)?;
        let body_len = size_field(body_len, u32::MAX as u64)?;
        let mut header = Vec::with_capacity(16);
        match self.format {
            RingFormat::Lzss => {
                header.extend_from_slice(b"SSZL");
                header.write_u32::<LittleEndian>(0)?;
                header.write_u32::<LittleEndian>(body_len)?;
                header.write_u32::<LittleEndian>(size)?;
            }
            RingFormat::TalesOf01 | RingFormat::TalesOf03 => {
                header.push(if self.has_runs() { 0x03 } else { 0x01 });
                header.write_u32::<LittleEndian>(body_len)?;
                header.write_u32::<LittleEndian>(size)?;
            }
            RingFormat::Iecp => {
                header.extend_from_slice(b"IECP");
                header.write_u32::<LittleEndian>(size)?;
            }
            RingFormat::LzEcd => {
                header.extend_from_slice(b"ECD\x01");
                header.write_u32::<BigEndian>(0)?;
                header.write_u32::<BigEndian>(body_len)?;
                header.write_u32::<BigEndian>(size)?;
            }
        }
        Ok(header)
    }

    /// Returns the decompressed size, the body, and whether it is stored.
    fn read_header<'a>(&self, input: &'a [u8]) -> Result<(usize, &'a [u8], bool)> {
        let mut cursor = Cursor::new(input);
        match self.format {
            RingFormat::Lzss => {
                expect_magic(&mut cursor, b"SSZL")?;
                cursor.read_u32::<LittleEndian>()?;
                let body_len = cursor.read_u32::<LittleEndian>()? as usize;
                let size = cursor.read_u32::<LittleEndian>()? as usize;
                Ok((size, region(input, 16, body_len)?, false))
            }
            RingFormat::TalesOf01 | RingFormat::TalesOf03 => {
                let expected = if self.has_runs() { 0x03 } else { 0x01 };
                expect_magic(&mut cursor, &[expected])?;
                let body_len = cursor.read_u32::<LittleEndian>()? as usize;
                let size = cursor.read_u32::<LittleEndian>()? as usize;
                Ok((size, region(input, 9, body_len)?, false))
            }
            RingFormat::Iecp => {
                expect_magic(&mut cursor, b"IECP")?;
                let size = cursor.read_u32::<LittleEndian>()? as usize;
                Ok((size, remaining(&cursor), false))
            }
            RingFormat::LzEcd => {
                expect_magic(&mut cursor, b"ECD")?;
                let stored = match cursor.read_u8()? {
                    0x00 => true,
                    0x01 => false,
                    other => {
                        return Err(KompressionError::invalid_header(format!(
                            "unknown LZ-ECD mode {other:#04x}"
                        )));
                    }
                };
                cursor.read_u32::<BigEndian>()?;
                let body_len = cursor.read_u32::<BigEndian>()? as usize;
                let size = cursor.read_u32::<BigEndian>()? as usize;
                Ok((size, region(input, 16, body_len)?, stored))
            }
        }
    }
}

impl LzScheme for RingLzss {
    fn configure(&self) -> LzConfig {
        let limits: &'static [FindLimits] = match self.format {
            RingFormat::TalesOf03 => &TALES_OF_03_LIMITS,
            RingFormat::LzEcd => &ECD_LIMITS,
            _ => &OKUMURA_LIMITS,
        };
        LzConfig::new(limits).with_pre_buffer(self.ring().size)
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) if self.has_runs() && m.length >= RUN_MIN => 25,
            Some(_) => 17,
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let ring = self.ring();
        let runs = self.has_runs();
        let body = encode_flagged(Vec::new(), STYLE, tokens, |writer, m| {
            if runs && m.length >= RUN_MIN {
                let value = m.position.checked_sub(1).map_or(0, |i| input[i]);
                writer.extend_from_slice(&[(m.length - RUN_MIN) as u8, 0x0F, value]);
                return;
            }
            let pos = (ring.start + m.position + ring.size - m.displacement) & ring.mask();
            writer.push(pos as u8);
            writer.push(((pos >> 8) << ring.length_bits | (m.length - 3)) as u8);
        });

        let mut output = self.write_header(input.len(), body.len())?;
        output.extend(body);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (size, body, stored) = self.read_header(input)?;
        if stored {
            return Ok(region(body, 0, size)?.to_vec());
        }

        let ring = self.ring();
        let runs = self.has_runs();
        let length_mask = (1usize << ring.length_bits) - 1;
        let history = History::with_limit(size).primed(ring.size);
        decode_flagged(body, STYLE, history, |cursor, history| {
            let lo = cursor.read_u8()? as usize;
            let hi = cursor.read_u8()? as usize;
            if runs && hi & 0x0F == 0x0F {
                let value = cursor.read_u8()?;
                return history.fill(value, lo + RUN_MIN);
            }

            let pos = (hi >> ring.length_bits) << 8 | lo;
            let write_pos = (ring.start + history.len()) & ring.mask();
            let distance = match (write_pos + ring.size - pos) & ring.mask() {
                0 => ring.size,
                d => d,
            };
            history.copy_match(distance, (hi & length_mask) + 3)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    const ALL: [RingLzss; 5] = [
        RingLzss::LZSS,
        RingLzss::TALES_OF_01,
        RingLzss::TALES_OF_03,
        RingLzss::IECP,
        RingLzss::LZ_ECD,
    ];

    #[test]
    fn test_all_variants_roundtrip() {
        let mut data = b"ring ring ring buffer".repeat(40);
        data.extend_from_slice(&[0xEE; 0x300]);
        data.extend((0..=255u8).rev());
        for codec in ALL {
            let packed = LzCodec(codec).encode(&data, &CompressOptions::default()).unwrap();
            assert!(packed.len() < data.len(), "{:?}", codec.format());
            assert_eq!(LzCodec(codec).decode(&packed).unwrap(), data);
        }
    }

    #[test]
    fn test_match_into_initial_zeros() {
        let packed = LzCodec(RingLzss::IECP)
            .encode(b"\0\0\0\0\0\0xyz", &CompressOptions::default())
            .unwrap();
        // First flag is a match.
        assert_eq!(packed[8] & 1, 0);
        assert_eq!(
            LzCodec(RingLzss::IECP).decode(&packed).unwrap(),
            b"\0\0\0\0\0\0xyz"
        );
    }

    #[test]
    fn test_known_lzss_stream() {
        // 'a' at ring 0xFEE, then copy 5 bytes from there.
        let mut packed = b"IECP".to_vec();
        packed.extend_from_slice(&[6, 0, 0, 0]);
        packed.extend_from_slice(&[0b01, b'a', 0xEE, 0xF2]);
        assert_eq!(LzCodec(RingLzss::IECP).decode(&packed).unwrap(), b"aaaaaa");
    }

    #[test]
    fn test_tales_of_03_runs() {
        let mut data = b"abc".to_vec();
        data.extend_from_slice(&[b'c'; 0x100]);
        let packed = LzCodec(RingLzss::TALES_OF_03)
            .encode(&data, &CompressOptions::default())
            .unwrap();
        assert_eq!(&packed[9..], &[0b0111, b'a', b'b', b'c', 0xED, 0x0F, b'c']);
        assert_eq!(LzCodec(RingLzss::TALES_OF_03).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_ecd_stored() {
        let mut packed = b"ECD\x00".to_vec();
        packed.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 3]);
        packed.extend_from_slice(b"raw");
        assert_eq!(LzCodec(RingLzss::LZ_ECD).decode(&packed).unwrap(), b"raw");
    }

    #[test]
    fn test_body_length_checked() {
        let mut packed = LzCodec(RingLzss::LZSS)
            .encode(b"hello hello hello", &CompressOptions::default())
            .unwrap();
        packed.pop();
        assert!(LzCodec(RingLzss::LZSS).decode(&packed).is_err());
    }
}
