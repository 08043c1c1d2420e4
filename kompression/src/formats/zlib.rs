//! ZLib (RFC 1950).
//!
//! ```text
//! +---+---+============+---+---+---+---+
//! |CMF|FLG| compressed |    ADLER32    |
//! +---+---+============+---+---+---+---+
//! ```
//!
//! - CMF: CM = 8 (Deflate) in the low nibble, CINFO = log2(window) - 8
//! - FLG: FCHECK makes `CMF * 256 + FLG` a multiple of 31, bit 5 is FDICT
//! - ADLER32 of the decompressed data, big-endian
//!
//! The encoder always writes `78 DA` (32 KiB window, maximum compression).

use super::deflate::{Deflate, inflate};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, ByteOrder};
use kompression_core::{BitReader, KompressionError, Result};
use kompression_lz::{Match, Token};
use std::io::Cursor;

/// Adler-32 checksum.
#[derive(Clone, Debug)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Bytes that can be summed before `b` could overflow.
const NMAX: usize = 5552;

impl Adler32 {
    /// Fresh checksum state.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Add `data` to the checksum.
    pub fn update(&mut self, data: &[u8]) {
        let (mut a, mut b) = (self.a, self.b);
        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                a += byte as u32;
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }
        self.a = a;
        self.b = b;
    }

    /// Current checksum value.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Checksum of `data` in one shot.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

const HEADER: [u8; 2] = [0x78, 0xDA];

fn check_header(cmf: u8, flg: u8) -> Result<()> {
    if cmf & 0x0F != 8 {
        return Err(KompressionError::invalid_header(format!(
            "compression method {} is not Deflate",
            cmf & 0x0F
        )));
    }
    if cmf >> 4 > 7 {
        return Err(KompressionError::invalid_header(format!(
            "window size 2^{} exceeds 32 KiB",
            (cmf >> 4) + 8
        )));
    }
    if (cmf as u16 * 256 + flg as u16) % 31 != 0 {
        return Err(KompressionError::invalid_header("zlib header check failed"));
    }
    if flg & 0x20 != 0 {
        return Err(KompressionError::unimplemented("zlib preset dictionary"));
    }
    Ok(())
}

/// ZLib: Deflate with a two-byte header and an Adler-32 trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZLib;

impl LzScheme for ZLib {
    fn configure(&self) -> LzConfig {
        Deflate.configure()
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        Deflate.price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let body = Deflate.serialize(input, tokens)?;
        let mut output = Vec::with_capacity(body.len() + 6);
        output.extend_from_slice(&HEADER);
        output.extend(body);
        output.extend_from_slice(&Adler32::checksum(input).to_be_bytes());
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        if input.len() < 6 {
            return Err(KompressionError::unexpected_eof((6 - input.len()) * 8));
        }
        check_header(input[0], input[1])?;

        let mut reader = BitReader::new(Cursor::new(&input[2..]));
        let output = inflate(&mut reader)?;
        reader.align_to_byte();
        let mut trailer = [0u8; 4];
        reader.read_bytes(&mut trailer)?;

        let expected = BigEndian::read_u32(&trailer);
        let computed = Adler32::checksum(&output);
        if expected != computed {
            return Err(KompressionError::checksum_mismatch(expected, computed));
        }
        Ok(output)
    }
}
