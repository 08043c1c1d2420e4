//! # Kompression
//!
//! LZ-family compression formats from game engines, all driven by one
//! optimal-parsing engine.
//!
//! Each format declares its match constraints and a price model; the
//! engine finds candidate matches, picks the cheapest token stream and
//! hands it back to the format for serialization.
//!
//! ## Example
//!
//! ```rust
//! use kompression::{FormatId, compress, decompress};
//!
//! let data = b"ABABABABAB";
//! let packed = compress(FormatId::Lz10, data).unwrap();
//! assert!(packed.len() < 10);
//!
//! let unpacked = decompress(FormatId::Lz10, &packed, Some(data.len())).unwrap();
//! assert_eq!(unpacked, data);
//! ```
//!
//! ## Formats
//!
//! | Family | Formats |
//! |--------|---------|
//! | Nintendo | LZ10, LZ11, LZ40, LZ60, Huffman, RLE, backward LZ77 |
//! | Nintendo 64 / GameCube | MIO0, Yay0, Yaz0 |
//! | Level-5 | LZ77, wrapped LZ10/Huffman/RLE |
//! | Ring LZSS | SSZL, Tales of 01/03, IECP, LZ-ECD |
//! | Standard | Deflate, ZLib, headerless LZ4 |
//! | Others | LZSS-VLC, Taiko LZ80/LZ81, WP16, LZE, LZ-ENC, ShadeLZ, PS-LZ, IR-LZ, CRILAYLA, Danganronpa 3, StingLZ |
//!
//! The full list with names lives in [`registry::FORMATS`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod formats;
pub mod registry;

pub use codec::{CompressOptions, Decoder, Encoder, LzCodec, LzConfig, LzScheme};
pub use kompression_core::{KompressionError, Result};
pub use kompression_lz::MatchStrategy;
pub use registry::{FORMATS, FormatEntry, FormatId, lookup, lookup_name};

/// Compress `input` into `format` with default options.
pub fn compress(format: FormatId, input: &[u8]) -> Result<Vec<u8>> {
    compress_with(format, input, &CompressOptions::default())
}

/// Compress `input` into `format`.
pub fn compress_with(format: FormatId, input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    let entry = lookup(format)?;
    let output = (entry.encoder)().encode(input, options)?;
    tracing::debug!(
        format = entry.name,
        input = input.len(),
        output = output.len(),
        "compressed"
    );
    Ok(output)
}

/// Decompress `input`, which must be exactly one compressed buffer of
/// `format`.
///
/// When `expected_output_len` is given, a decoded length that differs is a
/// [`KompressionError::SizeMismatch`].
pub fn decompress(
    format: FormatId,
    input: &[u8],
    expected_output_len: Option<usize>,
) -> Result<Vec<u8>> {
    let entry = lookup(format)?;
    let output = (entry.decoder)().decode(input)?;
    tracing::debug!(
        format = entry.name,
        input = input.len(),
        output = output.len(),
        "decompressed"
    );
    match expected_output_len {
        Some(expected) if expected != output.len() => {
            Err(KompressionError::size_mismatch(expected, output.len()))
        }
        _ => Ok(output),
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::codec::{CompressOptions, Decoder, Encoder};
    pub use crate::registry::FormatId;
    pub use crate::{compress, compress_with, decompress};
    pub use kompression_core::{KompressionError, Result};
    pub use kompression_lz::MatchStrategy;
}
