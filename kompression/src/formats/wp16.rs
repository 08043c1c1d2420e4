//! WP16, LZ over 16-bit units.
//!
//! `"Wp16"` and a u32 LE size precede the body. Flags are u32 LE words
//! consumed LSB-first; a set bit is a literal unit of two bytes (one at the
//! very end of an odd-sized buffer). A clear bit is a match word, u16 LE
//! `(disp / 2) << 5 | (len / 2 - 2)`; both fields count units.

use super::{expect_magic, remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{BitOrder, Endian, FlagLayout, FlagReader, FlagWriter, History, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;

const FLAGS: FlagLayout = FlagLayout::new(4, BitOrder::LsbFirst, Endian::Little);

/// WP16 constraint set, in bytes.
pub const WP16_LIMITS: FindLimits = FindLimits::new(4, 0x42, 2, 0xFFE).with_unit_size(2);

/// WP16.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wp16;

impl LzScheme for Wp16 {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[WP16_LIMITS])
    }

    fn price(&self, _candidate: Option<&Match>) -> u32 {
        17
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut header = b"Wp16".to_vec();
        header.write_u32::<LittleEndian>(size_field(input.len(), u32::MAX as u64)?)?;
        let mut writer = FlagWriter::with_output(FLAGS, header);

        let mut iter = tokens.iter().peekable();
        while let Some(token) = iter.next() {
            match token {
                Token::Literal(byte) => {
                    writer.write_flag(true);
                    writer.push(*byte);
                    if let Some(Token::Literal(second)) = iter.peek() {
                        writer.push(*second);
                        iter.next();
                    }
                }
                Token::Match(m) => {
                    writer.write_flag(false);
                    let word = ((m.displacement / 2) << 5 | (m.length / 2 - 2)) as u16;
                    writer.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        Ok(writer.finish())
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        expect_magic(&mut cursor, b"Wp16")?;
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let mut body = Cursor::new(remaining(&cursor));

        let mut flags = FlagReader::new(FLAGS);
        let mut history = History::with_limit(size);
        while !history.is_full() {
            if flags.read_flag(&mut body)? {
                let unit = (size - history.len()).min(2);
                for _ in 0..unit {
                    history.push(body.read_u8()?)?;
                }
            } else {
                let word = body.read_u16::<LittleEndian>()? as usize;
                history.copy_match((word >> 5) * 2, ((word & 0x1F) + 2) * 2)?;
            }
        }
        history.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};
    use kompression_lz::MatchStrategy;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_units() {
        let data = utf16("abab");
        let packed = LzCodec(Wp16).encode(&data, &CompressOptions::default()).unwrap();
        // Two literal units, then a two-unit match two units back.
        let mut expected = b"Wp16\x08\0\0\0".to_vec();
        expected.extend_from_slice(&[0b11, 0, 0, 0, b'a', 0, b'b', 0, 0x40, 0x00]);
        assert_eq!(packed, expected);
        assert_eq!(LzCodec(Wp16).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_odd_length() {
        let mut data = utf16("the quick brown fox, the quick brown fox");
        data.push(b'!');
        let packed = LzCodec(Wp16).encode(&data, &CompressOptions::default()).unwrap();
        assert_eq!(LzCodec(Wp16).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_matches_stay_unit_aligned() {
        // Byte-level repeats at odd offsets must not produce matches.
        let data = b"xabcabcabcabcabcabcy".to_vec();
        let tokens = LzCodec(Wp16).parse(&data, &CompressOptions::default()).unwrap();
        for token in tokens {
            if let Token::Match(m) = token {
                assert_eq!(m.position % 2, 0);
                assert_eq!(m.displacement % 2, 0);
                assert_eq!(m.length % 2, 0);
            }
        }
    }

    #[test]
    fn test_tree_finders_rejected() {
        let options = CompressOptions::default().with_strategy(MatchStrategy::SuffixTree);
        let err = LzCodec(Wp16).encode(&utf16("abc"), &options).unwrap_err();
        assert!(err.is_configuration());
    }
}
