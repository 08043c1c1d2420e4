//! Backward LZ77 (3DS code binaries).
//!
//! The decoder walks the compressed data from its end towards the start and
//! writes the output back to front, so the encoder parses the reversed
//! input and stores its token stream reversed.
//!
//! ```text
//! ┌────────────┬──────────────────────┬─────────┬──────────────────────┐
//! │ raw prefix │ reversed token bytes │ 0xFF pad│ footer (8 bytes)     │
//! └────────────┴──────────────────────┴─────────┴──────────────────────┘
//! footer: u32 LE compressed_len | header_len << 24, u32 LE size - total_len
//! ```
//!
//! `compressed_len` covers tokens, padding and footer; `header_len` covers
//! padding and footer. Whatever precedes the compressed region is copied
//! verbatim to the front of the output.

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use super::size_field;
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{FlagLayout, History, KompressionError, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::borrow::Cow;

const STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_MSB, false);
const FOOTER_LEN: usize = 8;

/// Backward LZ77 constraint set.
pub const BACKWARD_LZ77_LIMITS: FindLimits = FindLimits::new(3, 0x12, 3, 0x1002);

/// 3DS backward LZ77.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardLz77;

impl LzScheme for BackwardLz77 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[BACKWARD_LZ77_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        if candidate.is_some() { 17 } else { 9 }
    }

    fn prepare_input<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Owned(input.iter().rev().copied().collect())
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let stream = encode_flagged(Vec::new(), STYLE, tokens, |writer, m| {
            let word = ((m.length - 3) << 12 | (m.displacement - 3)) as u16;
            writer.extend_from_slice(&word.to_be_bytes());
        });

        let mut output: Vec<u8> = stream.into_iter().rev().collect();
        let pad = output.len().next_multiple_of(4) - output.len();
        output.resize(output.len() + pad, 0xFF);

        let header_len = (pad + FOOTER_LEN) as u32;
        let compressed_len = size_field(output.len() + FOOTER_LEN, 0xFF_FFFF)?;
        let size = size_field(input.len(), u32::MAX as u64)?;
        output.write_u32::<LittleEndian>(compressed_len | header_len << 24)?;
        output.write_u32::<LittleEndian>(size.wrapping_sub(compressed_len))?;
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (word, extra) =
            read_footer(input).ok_or_else(|| KompressionError::unexpected_eof(FOOTER_LEN))?;

        let compressed_len = (word & 0xFF_FFFF) as usize;
        let header_len = (word >> 24) as usize;
        if header_len < FOOTER_LEN || header_len > compressed_len || compressed_len > input.len() {
            return Err(KompressionError::invalid_header(format!(
                "footer lengths {compressed_len:#x}/{header_len:#x} do not fit {} bytes",
                input.len()
            )));
        }

        let prefix_len = input.len() - compressed_len;
        let prefix = &input[..prefix_len];
        let stream: Vec<u8> = input[prefix_len..input.len() - header_len]
            .iter()
            .rev()
            .copied()
            .collect();

        let size = (input.len() as u32).wrapping_add(extra) as usize;
        let decoded_len = size
            .checked_sub(prefix_len)
            .ok_or_else(|| KompressionError::size_mismatch(size, prefix_len))?;

        let reversed = decode_flagged(
            &stream,
            STYLE,
            History::with_limit(decoded_len),
            |cursor, history| {
                let word = cursor.read_u16::<BigEndian>()? as usize;
                history.copy_match((word & 0xFFF) + 3, (word >> 12) + 3)
            },
        )?;

        let mut output = Vec::with_capacity(size);
        output.extend_from_slice(prefix);
        output.extend(reversed.into_iter().rev());
        Ok(output)
    }
}

/// Footer words of a backward LZ77 buffer: the packed lengths and the size
/// difference.
pub fn read_footer(input: &[u8]) -> Option<(u32, u32)> {
    let footer = input.get(input.len().checked_sub(FOOTER_LEN)?..)?;
    Some((LittleEndian::read_u32(footer), LittleEndian::read_u32(&footer[4..])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    #[test]
    fn test_footer_layout() {
        let data = b"0123012301230123".repeat(8);
        let packed = LzCodec(BackwardLz77)
            .encode(&data, &CompressOptions::default())
            .unwrap();
        assert_eq!(packed.len() % 4, 0);
        let (word, extra) = read_footer(&packed).unwrap();
        assert_eq!(word & 0xFF_FFFF, packed.len() as u32);
        assert_eq!((packed.len() as u32).wrapping_add(extra), data.len() as u32);
        assert_eq!(LzCodec(BackwardLz77).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_raw_prefix_kept() {
        let data = b"xyzxyzxyzxyzxyzxyz".to_vec();
        let packed = LzCodec(BackwardLz77)
            .encode(&data, &CompressOptions::default())
            .unwrap();
        let mut framed = b"HDR!".to_vec();
        framed.extend_from_slice(&packed);
        let decoded = LzCodec(BackwardLz77).decode(&framed).unwrap();
        assert_eq!(&decoded[..4], b"HDR!");
        assert_eq!(&decoded[4..], &data[..]);
    }

    #[test]
    fn test_bad_footer() {
        let err = LzCodec(BackwardLz77)
            .decode(&[0, 0, 0, 0, 0x20, 0, 0, 0x08, 0, 0, 0, 0])
            .unwrap_err();
        assert!(matches!(err, KompressionError::InvalidHeader { .. }));
        assert!(LzCodec(BackwardLz77).decode(&[1, 2, 3]).is_err());
    }
}
