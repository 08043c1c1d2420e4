//! CRI Layla.
//!
//! ```text
//! 0x00  "CRILAYLA"
//! 0x08  u32 LE  size of the compressed part once decoded
//! 0x0C  u32 LE  bit stream size
//! 0x10  bit stream
//!       first min(0x100, size) bytes of the data, stored raw
//! ```
//!
//! Everything after the raw prefix is compressed back to front: the
//! decoder walks the bit stream from its last byte towards the first,
//! reading each byte MSB first, and fills the output from the end. Working
//! on the reversed data turns this into an ordinary forward LZ, so the
//! encoder parses the reversed tail and reverses the finished stream.
//!
//! ```text
//! 0 + 8 bits                        literal
//! 1 + 13 bits (disp - 3) + length   match, disp 3..=0x2002
//! ```
//!
//! Match lengths are `3 + n`, with `n` spread over fields of 2, 3 and 5
//! bits and then any number of 8-bit fields; a saturated field means
//! another one follows.

use super::{expect_magic, region, size_field, tail};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{History, KompressionError, MsbBitReader, MsbBitWriter, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::borrow::Cow;
use std::io::Cursor;

const MAGIC: &[u8; 8] = b"CRILAYLA";

/// Bytes stored raw at the end of the file.
pub const RAW_PREFIX: usize = 0x100;

/// CRILAYLA constraint set.
pub const CRILAYLA_LIMITS: FindLimits = FindLimits::new(3, 0xFFFF, 3, 0x2002);

const LENGTH_FIELDS: [u8; 3] = [2, 3, 5];

fn length_bits(mut n: usize) -> u32 {
    let mut bits = 0;
    for width in LENGTH_FIELDS {
        let max = (1 << width) - 1;
        bits += width as u32;
        if n < max {
            return bits;
        }
        n -= max;
    }
    bits + 8 * (n / 0xFF + 1) as u32
}

fn write_length(writer: &mut MsbBitWriter, mut n: usize) {
    for width in LENGTH_FIELDS {
        let max = (1 << width) - 1;
        if n < max {
            writer.write_bits(n as u32, width);
            return;
        }
        writer.write_bits(max as u32, width);
        n -= max;
    }
    while n >= 0xFF {
        writer.write_bits(0xFF, 8);
        n -= 0xFF;
    }
    writer.write_bits(n as u32, 8);
}

fn read_length(reader: &mut MsbBitReader<'_>) -> Result<usize> {
    let mut n = 0;
    for width in LENGTH_FIELDS {
        let max = (1 << width) - 1;
        let field = reader.read_bits(width)? as usize;
        n += field;
        if field != max {
            return Ok(n);
        }
    }
    loop {
        let field = reader.read_bits(8)? as usize;
        n += field;
        if field != 0xFF {
            return Ok(n);
        }
    }
}

/// CRI Layla.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crilayla;

impl LzScheme for Crilayla {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[CRILAYLA_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) => 14 + length_bits(m.length - 3),
        }
    }

    fn prepare_input<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        let rest = input.get(RAW_PREFIX..).unwrap_or_default();
        Cow::Owned(rest.iter().rev().copied().collect())
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut writer = MsbBitWriter::new();
        for token in tokens {
            match token {
                Token::Literal(byte) => {
                    writer.write_bit(false);
                    writer.write_bits(*byte as u32, 8);
                }
                Token::Match(m) => {
                    writer.write_bit(true);
                    writer.write_bits((m.displacement - 3) as u32, 13);
                    write_length(&mut writer, m.length - 3);
                }
            }
        }
        let mut stream = writer.into_vec();
        stream.reverse();

        let prefix = RAW_PREFIX.min(input.len());
        let mut output = Vec::with_capacity(16 + stream.len() + prefix);
        output.extend_from_slice(MAGIC);
        output.write_u32::<LittleEndian>(size_field(input.len() - prefix, u32::MAX as u64)?)?;
        output.write_u32::<LittleEndian>(size_field(stream.len(), u32::MAX as u64)?)?;
        output.extend(stream);
        output.extend_from_slice(&input[..prefix]);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        expect_magic(&mut cursor, MAGIC)?;
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let stream_len = cursor.read_u32::<LittleEndian>()? as usize;
        let stream = region(input, 16, stream_len)?;
        let prefix = tail(input, 16 + stream_len)?;

        let expected_prefix = if size > 0 { RAW_PREFIX } else { prefix.len().min(RAW_PREFIX) };
        if prefix.len() != expected_prefix {
            return Err(KompressionError::invalid_header(format!(
                "raw prefix is {} bytes, expected {expected_prefix}",
                prefix.len()
            )));
        }

        let stream: Vec<u8> = stream.iter().rev().copied().collect();
        let mut reader = MsbBitReader::new(&stream);
        let mut history = History::with_limit(size);
        while !history.is_full() {
            if reader.read_bit()? {
                let disp = reader.read_bits(13)? as usize + 3;
                let length = read_length(&mut reader)? + 3;
                history.copy_match(disp, length)?;
            } else {
                history.push(reader.read_bits(8)? as u8)?;
            }
        }

        let mut output = Vec::with_capacity(prefix.len() + size);
        output.extend_from_slice(prefix);
        output.extend(history.finish()?.into_iter().rev());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    fn with_prefix(rest: &[u8]) -> Vec<u8> {
        let mut data = vec![b'P'; RAW_PREFIX];
        data.extend_from_slice(rest);
        data
    }

    #[test]
    fn test_reversed_stream() {
        let data = with_prefix(b"xyzxyz");
        let packed = LzCodec(Crilayla).encode(&data, &CompressOptions::default()).unwrap();

        let mut expected = b"CRILAYLA".to_vec();
        expected.extend_from_slice(&[6, 0, 0, 0, 6, 0, 0, 0]);
        // "zyx" as literals, then a match of 3 at distance 3, bytes reversed.
        expected.extend_from_slice(&[0x00, 0x00, 0x10, 0x4F, 0x1E, 0x3D]);
        expected.extend_from_slice(&data[..RAW_PREFIX]);
        assert_eq!(packed, expected);
        assert_eq!(LzCodec(Crilayla).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_short_input_is_stored() {
        let packed = LzCodec(Crilayla).encode(b"tiny", &CompressOptions::default()).unwrap();
        assert_eq!(packed, b"CRILAYLA\0\0\0\0\0\0\0\0tiny");
        assert_eq!(LzCodec(Crilayla).decode(&packed).unwrap(), b"tiny");
    }

    #[test]
    fn test_lengths() {
        for n in [0, 2, 3, 9, 10, 40, 41, 295, 296, 0xFFFC] {
            let mut writer = MsbBitWriter::new();
            write_length(&mut writer, n);
            assert_eq!(writer.bit_len(), length_bits(n) as u64, "n = {n}");
            let bytes = writer.into_vec();
            assert_eq!(read_length(&mut MsbBitReader::new(&bytes)).unwrap(), n);
        }
    }

    #[test]
    fn test_roundtrip() {
        let mut rest = b"CRI middleware ".repeat(200);
        rest.extend((0..3000u32).map(|i| (i * 13 % 256) as u8));
        rest.extend(std::iter::repeat_n(0u8, 5000));
        let data = with_prefix(&rest);
        let packed = LzCodec(Crilayla).encode(&data, &CompressOptions::default()).unwrap();
        assert!(packed.len() < data.len() / 2);
        assert_eq!(packed[packed.len() - RAW_PREFIX..], data[..RAW_PREFIX]);
        assert_eq!(LzCodec(Crilayla).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_malformed() {
        let data = with_prefix(b"xyzxyz");
        let packed = LzCodec(Crilayla).encode(&data, &CompressOptions::default()).unwrap();
        // Missing part of the raw prefix.
        assert!(LzCodec(Crilayla).decode(&packed[..packed.len() - 1]).is_err());
        // Stream size past the end.
        let mut bad = packed.clone();
        bad[12] = 0xFF;
        assert!(LzCodec(Crilayla).decode(&bad).is_err());
        assert!(LzCodec(Crilayla).decode(b"CRILAYLX").is_err());
    }
}
