//! Level-5 wrapper around the Nintendo bodies.
//!
//! A u32 LE header holds `size << 3 | method`; the body that follows is the
//! matching Nintendo body without its own header. The decoder accepts any
//! method, whichever variant was asked for.
//!
//! | Method | Body |
//! |--------|------|
//! | 0 | raw bytes |
//! | 1 | LZ10 |
//! | 2 | Huffman, 4-bit symbols |
//! | 3 | Huffman, 8-bit symbols |
//! | 4 | RLE |

use super::nintendo::Lz10;
use super::nintendo_huffman::NintendoHuffman;
use super::nintendo_rle::NintendoRle;
use super::{region, remaining, size_field};
use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{KompressionError, Result};
use std::io::Cursor;

/// Body method stored in the low three header bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Level5Method {
    /// Stored.
    Raw = 0,
    /// LZ10 token stream.
    Lz10 = 1,
    /// 4-bit Huffman.
    Huffman4 = 2,
    /// 8-bit Huffman.
    Huffman8 = 3,
    /// Nintendo RLE blocks.
    Rle = 4,
}

impl Level5Method {
    fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Lz10),
            2 => Ok(Self::Huffman4),
            3 => Ok(Self::Huffman8),
            4 => Ok(Self::Rle),
            other => Err(KompressionError::invalid_header(format!(
                "unknown Level-5 method {other}"
            ))),
        }
    }
}

/// Level-5 codec writing one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level5 {
    method: Level5Method,
}

impl Level5 {
    /// Codec writing `method` bodies.
    pub const fn new(method: Level5Method) -> Self {
        Self { method }
    }

    /// Method written by the encoder.
    pub fn method(&self) -> Level5Method {
        self.method
    }
}

impl Encoder for Level5 {
    fn encode(&self, input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
        let size = size_field(input.len(), 0x1FFF_FFFF)?;
        let mut output = Vec::new();
        output.write_u32::<LittleEndian>(size << 3 | self.method as u32)?;

        match self.method {
            Level5Method::Raw => output.extend_from_slice(input),
            Level5Method::Lz10 => {
                let tokens = LzCodec(Lz10).parse(input, options)?;
                output = Lz10::write_body(output, &tokens);
            }
            Level5Method::Huffman4 => {
                output.extend(NintendoHuffman::HUFFMAN4_LE.encode_body(input)?);
            }
            Level5Method::Huffman8 => {
                output.extend(NintendoHuffman::HUFFMAN8.encode_body(input)?);
            }
            Level5Method::Rle => output = NintendoRle::encode_body(output, input),
        }
        Ok(output)
    }
}

impl Decoder for Level5 {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let header = cursor.read_u32::<LittleEndian>()?;
        let size = (header >> 3) as usize;
        let body = remaining(&cursor);

        match Level5Method::from_bits((header & 7) as u8)? {
            Level5Method::Raw => Ok(region(body, 0, size)?.to_vec()),
            Level5Method::Lz10 => Lz10::read_body(body, size),
            Level5Method::Huffman4 => NintendoHuffman::HUFFMAN4_LE.decode_body(body, size),
            Level5Method::Huffman8 => NintendoHuffman::HUFFMAN8.decode_body(body, size),
            Level5Method::Rle => NintendoRle::decode_body(body, size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [Level5Method; 5] = [
        Level5Method::Raw,
        Level5Method::Lz10,
        Level5Method::Huffman4,
        Level5Method::Huffman8,
        Level5Method::Rle,
    ];

    #[test]
    fn test_methods_roundtrip() {
        let data = b"Level-5 Level-5 Level-5 aaaaaaaaaaaaaaaaaaaaaaaa end".to_vec();
        for method in METHODS {
            let codec = Level5::new(method);
            let packed = codec.encode(&data, &CompressOptions::default()).unwrap();
            assert_eq!(packed[0] & 7, method as u8);
            assert_eq!(codec.decode(&packed).unwrap(), data, "{method:?}");
        }
    }

    #[test]
    fn test_decoder_dispatches_on_header() {
        let packed = Level5::new(Level5Method::Rle)
            .encode(b"zzzzzzzz", &CompressOptions::default())
            .unwrap();
        let decoded = Level5::new(Level5Method::Lz10).decode(&packed).unwrap();
        assert_eq!(decoded, b"zzzzzzzz");
    }

    #[test]
    fn test_unknown_method() {
        let err = Level5::new(Level5Method::Raw)
            .decode(&[0x0D, 0, 0, 0, 0])
            .unwrap_err();
        assert!(matches!(err, KompressionError::InvalidHeader { .. }));
    }
}
