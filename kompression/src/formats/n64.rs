//! MIO0, Yay0 and Yaz0.
//!
//! All three start with a four-byte magic and the decompressed size, and a
//! flag bit set to 1 marks a literal. They come in a big-endian flavour
//! (N64, GameCube, Wii) and a little-endian one used by later ports; the
//! byte order applies to every header field, flag word and match word.
//!
//! ```text
//! MIO0  magic | size | comp_off | raw_off | u32 flag words ...
//!       comp region: u16 (len - 3) << 12 | (disp - 1)
//!       raw region:  literals
//! Yay0  magic | size | link_off | chunk_off | u32 flag words ...
//!       link region:  u16 n << 12 | (disp - 1), n = len - 2 or 0
//!       chunk region: literals and, for n = 0, a length byte len - 0x12
//! Yaz0  magic | size | 8 zero bytes | flag byte, then the group's items
//!       inline: a literal or u16 n << 12 | (disp - 1) [+ len - 0x12 byte]
//! ```

use super::flagged::{FlagStyle, decode_flagged, encode_flagged};
use super::{expect_magic, remaining, size_field, tail};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{
    BitOrder, Endian, FlagLayout, FlagReader, FlagWriter, History, KompressionError, Result,
};
use kompression_lz::{FindLimits, Match, Token};
use std::io::Cursor;
use std::marker::PhantomData;

/// Byte orders the N64-family formats come in.
pub trait WordOrder: ByteOrder + Send + Sync + 'static {
    /// Matching flag-group byte order.
    const ENDIAN: Endian;

    /// 32-bit flag words in this byte order.
    const FLAG_WORDS: FlagLayout = FlagLayout::new(4, BitOrder::MsbFirst, Self::ENDIAN);
}

impl WordOrder for LittleEndian {
    const ENDIAN: Endian = Endian::Little;
}

impl WordOrder for BigEndian {
    const ENDIAN: Endian = Endian::Big;
}

const HEADER_LEN: usize = 16;

/// MIO0 constraint set.
pub const MIO0_LIMITS: FindLimits = FindLimits::new(3, 0x12, 1, 0x1000);

/// Yay0 and Yaz0 constraint set.
pub const YAZ0_LIMITS: FindLimits = FindLimits::new(3, 0x111, 1, 0x1000);

fn write_header<E: WordOrder>(magic: &[u8; 4], words: [usize; 3]) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(magic);
    for word in words {
        header.write_u32::<E>(size_field(word, u32::MAX as u64)?)?;
    }
    Ok(header)
}

fn read_header<E: WordOrder>(input: &[u8], magic: &[u8; 4]) -> Result<[usize; 3]> {
    let mut cursor = Cursor::new(input);
    expect_magic(&mut cursor, magic)?;
    let mut words = [0; 3];
    for word in &mut words {
        *word = cursor.read_u32::<E>()? as usize;
    }
    Ok(words)
}

/// Length-tiered price shared by Yay0 and Yaz0.
fn yaz0_price(candidate: Option<&Match>) -> u32 {
    match candidate {
        None => 9,
        Some(m) if m.length <= 0x11 => 17,
        Some(_) => 25,
    }
}

/// MIO0 in byte order `E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mio0<E>(PhantomData<E>);

/// Little-endian MIO0.
pub type Mio0Le = Mio0<LittleEndian>;
/// Big-endian MIO0.
pub type Mio0Be = Mio0<BigEndian>;

impl<E: WordOrder> LzScheme for Mio0<E> {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[MIO0_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        if candidate.is_some() { 17 } else { 9 }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut flags = FlagWriter::new(E::FLAG_WORDS);
        let mut comp = Vec::new();
        let mut raw = Vec::new();
        for token in tokens {
            match token {
                Token::Literal(byte) => {
                    flags.write_flag(true);
                    raw.push(*byte);
                }
                Token::Match(m) => {
                    flags.write_flag(false);
                    comp.write_u16::<E>(((m.length - 3) << 12 | (m.displacement - 1)) as u16)?;
                }
            }
        }
        let flags = flags.finish();

        let comp_off = HEADER_LEN + flags.len();
        let raw_off = comp_off + comp.len();
        let mut output = write_header::<E>(b"MIO0", [input.len(), comp_off, raw_off])?;
        output.extend(flags);
        output.extend(comp);
        output.extend(raw);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let [size, comp_off, raw_off] = read_header::<E>(input, b"MIO0")?;
        let mut flag_words = Cursor::new(tail(input, HEADER_LEN)?);
        let mut comp = Cursor::new(tail(input, comp_off)?);
        let mut raw = Cursor::new(tail(input, raw_off)?);

        let mut flags = FlagReader::new(E::FLAG_WORDS);
        let mut history = History::with_limit(size);
        while !history.is_full() {
            if flags.read_flag(&mut flag_words)? {
                history.push(raw.read_u8()?)?;
            } else {
                let word = comp.read_u16::<E>()? as usize;
                history.copy_match((word & 0xFFF) + 1, (word >> 12) + 3)?;
            }
        }
        history.finish()
    }
}

/// Yay0 in byte order `E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yay0<E>(PhantomData<E>);

/// Little-endian Yay0.
pub type Yay0Le = Yay0<LittleEndian>;
/// Big-endian Yay0.
pub type Yay0Be = Yay0<BigEndian>;

impl<E: WordOrder> LzScheme for Yay0<E> {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[YAZ0_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        yaz0_price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut flags = FlagWriter::new(E::FLAG_WORDS);
        let mut link = Vec::new();
        let mut chunk = Vec::new();
        for token in tokens {
            match token {
                Token::Literal(byte) => {
                    flags.write_flag(true);
                    chunk.push(*byte);
                }
                Token::Match(m) => {
                    flags.write_flag(false);
                    let disp = (m.displacement - 1) as u16;
                    if m.length <= 0x11 {
                        link.write_u16::<E>(((m.length - 2) as u16) << 12 | disp)?;
                    } else {
                        link.write_u16::<E>(disp)?;
                        chunk.push((m.length - 0x12) as u8);
                    }
                }
            }
        }
        let flags = flags.finish();

        let link_off = HEADER_LEN + flags.len();
        let chunk_off = link_off + link.len();
        let mut output = write_header::<E>(b"Yay0", [input.len(), link_off, chunk_off])?;
        output.extend(flags);
        output.extend(link);
        output.extend(chunk);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let [size, link_off, chunk_off] = read_header::<E>(input, b"Yay0")?;
        let mut flag_words = Cursor::new(tail(input, HEADER_LEN)?);
        let mut link = Cursor::new(tail(input, link_off)?);
        let mut chunk = Cursor::new(tail(input, chunk_off)?);

        let mut flags = FlagReader::new(E::FLAG_WORDS);
        let mut history = History::with_limit(size);
        while !history.is_full() {
            if flags.read_flag(&mut flag_words)? {
                history.push(chunk.read_u8()?)?;
                continue;
            }
            let word = link.read_u16::<E>()? as usize;
            let length = match word >> 12 {
                0 => chunk.read_u8()? as usize + 0x12,
                n => n + 2,
            };
            history.copy_match((word & 0xFFF) + 1, length)?;
        }
        history.finish()
    }
}

const YAZ0_STYLE: FlagStyle = FlagStyle::new(FlagLayout::BYTE_MSB, true);

/// Yaz0 in byte order `E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaz0<E>(PhantomData<E>);

/// Little-endian Yaz0.
pub type Yaz0Le = Yaz0<LittleEndian>;
/// Big-endian Yaz0.
pub type Yaz0Be = Yaz0<BigEndian>;

impl<E: WordOrder> LzScheme for Yaz0<E> {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[YAZ0_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        yaz0_price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut header = b"Yaz0".to_vec();
        header.write_u32::<E>(size_field(input.len(), u32::MAX as u64)?)?;
        header.extend_from_slice(&[0; 8]);

        Ok(encode_flagged(header, YAZ0_STYLE, tokens, |writer, m| {
            let disp = (m.displacement - 1) as u16;
            let mut word = [0u8; 2];
            if m.length <= 0x11 {
                E::write_u16(&mut word, ((m.length - 2) as u16) << 12 | disp);
                writer.extend_from_slice(&word);
            } else {
                E::write_u16(&mut word, disp);
                writer.extend_from_slice(&word);
                writer.push((m.length - 0x12) as u8);
            }
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        expect_magic(&mut cursor, b"Yaz0")?;
        let size = cursor.read_u32::<E>()? as usize;
        cursor.set_position(HEADER_LEN as u64);
        if input.len() < HEADER_LEN {
            return Err(KompressionError::unexpected_eof(HEADER_LEN));
        }

        decode_flagged(
            remaining(&cursor),
            YAZ0_STYLE,
            History::with_limit(size),
            |cursor, history| {
                let word = cursor.read_u16::<E>()? as usize;
                let length = match word >> 12 {
                    0 => cursor.read_u8()? as usize + 0x12,
                    n => n + 2,
                };
                history.copy_match((word & 0xFFF) + 1, length)
            },
        )
    }
}
