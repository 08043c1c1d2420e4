//! Level-5 LZ77.
//!
//! Headerless. Flag bytes are read LSB-first and a set bit marks a match.
//! A match is a displacement byte and a length byte, followed by one
//! literal that is always stored with it, so a match is never directly
//! followed by another match.

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use crate::codec::{LzConfig, LzScheme};
use byteorder::ReadBytesExt;
use kompression_core::{FlagLayout, History, Result};
use kompression_lz::{FindLimits, Match, Token};

const STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_LSB, false);

/// Level-5 LZ77 constraint set.
pub const LZ77_LIMITS: FindLimits = FindLimits::new(2, 0xFF, 1, 0xFF);

/// Level-5 LZ77 with a literal after every match.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz77;

impl LzScheme for Lz77 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ77_LIMITS]).with_trailing_literals(1)
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        if candidate.is_some() { 25 } else { 9 }
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        Ok(encode_flagged(Vec::new(), STYLE, tokens, |writer, m| {
            writer.push(m.displacement as u8);
            writer.push(m.length as u8);
            if let Some(bytes) = &m.discrepancy {
                writer.extend_from_slice(bytes);
            }
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        decode_flagged(input, STYLE, History::new(), |cursor, history| {
            let displacement = cursor.read_u8()? as usize;
            let length = cursor.read_u8()? as usize;
            history.copy_match(displacement, length)?;
            history.push(cursor.read_u8()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    #[test]
    fn test_match_carries_literal() {
        let packed = LzCodec(Lz77)
            .encode(b"abababababX", &CompressOptions::default())
            .unwrap();
        // a, b, then one match of 8 followed by the stored 'X'.
        assert_eq!(packed, [0b100, b'a', b'b', 2, 8, b'X']);
        assert_eq!(LzCodec(Lz77).decode(&packed).unwrap(), b"abababababX");
    }

    #[test]
    fn test_match_at_end_keeps_room() {
        let data = vec![b'q'; 300];
        let packed = LzCodec(Lz77)
            .encode(&data, &CompressOptions::default())
            .unwrap();
        assert_eq!(LzCodec(Lz77).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_empty() {
        let packed = LzCodec(Lz77).encode(b"", &CompressOptions::default()).unwrap();
        assert!(packed.is_empty());
        assert!(LzCodec(Lz77).decode(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_missing_trailing_literal() {
        assert!(LzCodec(Lz77).decode(&[0b10, b'a', 1, 4]).is_err());
    }
}
