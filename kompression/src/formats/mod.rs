//! Codec variants.
//!
//! | Module | Formats |
//! |--------|---------|
//! | [`nintendo`] | LZ10, LZ11, LZ40, LZ60 |
//! | [`nintendo_huffman`] | Huffman 4-bit (both nibble orders), Huffman 8-bit |
//! | [`nintendo_rle`] | Nintendo RLE |
//! | [`level5`] | Level-5 wrapped LZ10, Huffman and RLE |
//! | [`lz77`] | Level-5 LZ77 (literal after every match) |
//! | [`backward`] | 3DS backward LZ77 |
//! | [`n64`] | MIO0, Yay0, Yaz0 |
//! | [`ring`] | Okumura ring LZSS: SSZL, Tales of 01/03, IECP, LZ-ECD |
//! | [`vlc`] | LZSS with variable-length integers |
//! | [`taiko`] | Taiko LZ80 (three tiers), LZ81 (Huffman hybrid) |
//! | [`wp16`] | 16-bit unit LZ |
//! | [`lze`] | LZE (2-bit codes, two match tiers) |
//! | [`runs`] | literal-run formats: LZ-ENC, ShadeLZ, PS-LZ |
//! | [`fixed`] | one-word matches: IR-LZ, StingLZ, Danganronpa 3 |
//! | [`deflate`], [`zlib`] | RFC 1951 / RFC 1950 |
//! | [`crilayla`] | CRI Layla |
//! | [`lz4`] | headerless LZ4 blocks |

pub mod backward;
pub mod crilayla;
pub mod deflate;
pub mod fixed;
mod flagged;
pub mod level5;
pub mod lz4;
pub mod lz77;
pub mod lze;
pub mod n64;
pub mod nintendo;
pub mod nintendo_huffman;
pub mod nintendo_rle;
pub mod ring;
pub mod runs;
mod slots;
pub mod taiko;
pub mod vlc;
pub mod wp16;
pub mod zlib;

use byteorder::ReadBytesExt;
use kompression_core::{KompressionError, Result};
use std::io::Cursor;

/// Check a magic sequence at the cursor.
pub(crate) fn expect_magic(cursor: &mut Cursor<&[u8]>, expected: &[u8]) -> Result<()> {
    let mut found = Vec::with_capacity(expected.len());
    for _ in 0..expected.len() {
        found.push(cursor.read_u8()?);
    }
    if found != expected {
        return Err(KompressionError::invalid_magic(expected, found));
    }
    Ok(())
}

/// A size field must fit the width the format gives it.
pub(crate) fn size_field(size: usize, max: u64) -> Result<u32> {
    if size as u64 > max {
        return Err(KompressionError::configuration(format!(
            "{size} bytes exceed the format's size field (max {max})"
        )));
    }
    Ok(size as u32)
}

/// The remaining bytes of the cursor's buffer.
pub(crate) fn remaining<'a>(cursor: &Cursor<&'a [u8]>) -> &'a [u8] {
    let data: &'a [u8] = *cursor.get_ref();
    &data[(cursor.position() as usize).min(data.len())..]
}

/// Check a region `offset..offset + len` lies inside `input`.
pub(crate) fn region(input: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| input.get(offset..end))
        .ok_or_else(|| {
            KompressionError::malformed(
                offset as u64,
                format!("region of {len} bytes runs past the end of the input"),
            )
        })
}

/// Everything from `offset` to the end of `input`.
pub(crate) fn tail(input: &[u8], offset: usize) -> Result<&[u8]> {
    region(input, offset, input.len().saturating_sub(offset))
}
