//! Formats built from literal runs and matches, without flag groups.
//!
//! A code byte either announces a run of literals or starts a match:
//!
//! ```text
//! LZ-ENC   000ccccc                     c + 1 literals
//!          LLLDDDDD [EEEEEEEE] DDDDDDDD  len L + 2 (L = 7: E + 9), disp D + 1
//! ShadeLZ  0ccccccc                     c + 1 literals
//!          1LLLLLDD DDDDDDDD            len L + 3, disp D + 1
//! PS-LZ    00cccccc                     c + 1 literals
//!          01LLLLLL DDDDDDDD            len L + 3, disp D + 1
//!          1LLLLLLL DDDDDDDD DDDDDDDD   len L + 3, disp D + 1 (u16 LE)
//! ```
//!
//! LZ-ENC is headerless. ShadeLZ carries the decompressed size and the body
//! size as u32 LE (the headerless flavour drops both), PS-LZ only the
//! decompressed size.

use super::{region, remaining, size_field};
use crate::codec::{LzConfig, LzScheme};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use kompression_core::{History, KompressionError, Result};
use kompression_lz::{FindLimits, Match, Token};
use std::io::{Cursor, Read};

/// Write tokens as literal runs of at most `max_run` bytes and matches.
fn write_runs<C, M>(
    mut output: Vec<u8>,
    tokens: &[Token],
    max_run: usize,
    run_code: C,
    mut write_match: M,
) -> Vec<u8>
where
    C: Fn(usize) -> u8,
    M: FnMut(&mut Vec<u8>, &Match),
{
    let mut literals = Vec::new();
    let flush = |output: &mut Vec<u8>, literals: &mut Vec<u8>| {
        for run in literals.chunks(max_run) {
            output.push(run_code(run.len()));
            output.extend_from_slice(run);
        }
        literals.clear();
    };

    for token in tokens {
        match token {
            Token::Literal(byte) => literals.push(*byte),
            Token::Match(m) => {
                flush(&mut output, &mut literals);
                write_match(&mut output, m);
            }
        }
    }
    flush(&mut output, &mut literals);
    output
}

/// Copy a run of `count` literals from the cursor.
fn read_run(cursor: &mut Cursor<&[u8]>, history: &mut History, count: usize) -> Result<()> {
    let mut run = vec![0u8; count];
    cursor.read_exact(&mut run)?;
    history.extend_from_slice(&run)
}

fn at_end(cursor: &Cursor<&[u8]>) -> bool {
    cursor.position() as usize >= cursor.get_ref().len()
}

/// LZ-ENC constraint set.
pub const LZ_ENC_LIMITS: FindLimits = FindLimits::new(3, 0x108, 1, 0x2000);

/// LZ-ENC, an LZF-style byte format.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzEnc;

impl LzScheme for LzEnc {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[LZ_ENC_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) if m.length <= 8 => 16,
            Some(_) => 24,
        }
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        Ok(write_runs(Vec::new(), tokens, 0x20, |n| (n - 1) as u8, |output, m| {
            let disp = m.displacement - 1;
            let len = m.length - 2;
            if len < 7 {
                output.push((len << 5 | disp >> 8) as u8);
            } else {
                output.push((7 << 5 | disp >> 8) as u8);
                output.push((len - 7) as u8);
            }
            output.push(disp as u8);
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let mut history = History::new();
        while !at_end(&cursor) {
            let code = cursor.read_u8()? as usize;
            if code < 0x20 {
                read_run(&mut cursor, &mut history, code + 1)?;
                continue;
            }
            let mut length = code >> 5;
            if length == 7 {
                length += cursor.read_u8()? as usize;
            }
            let lo = cursor.read_u8()? as usize;
            history.copy_match(((code & 0x1F) << 8 | lo) + 1, length + 2)?;
        }
        history.finish()
    }
}

/// ShadeLZ constraint set.
pub const SHADE_LZ_LIMITS: FindLimits = FindLimits::new(3, 0x22, 1, 0x400);

fn write_shade_body(output: Vec<u8>, tokens: &[Token]) -> Vec<u8> {
    write_runs(output, tokens, 0x80, |n| (n - 1) as u8, |output, m| {
        let word = 0x8000 | (m.length - 3) << 10 | (m.displacement - 1);
        output.extend_from_slice(&(word as u16).to_be_bytes());
    })
}

fn read_shade_body(body: &[u8], mut history: History) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(body);
    let sized = history.limit().is_some();
    while if sized { !history.is_full() } else { !at_end(&cursor) } {
        let code = cursor.read_u8()? as usize;
        if code & 0x80 == 0 {
            read_run(&mut cursor, &mut history, code + 1)?;
            continue;
        }
        let lo = cursor.read_u8()? as usize;
        history.copy_match(((code & 3) << 8 | lo) + 1, (code >> 2 & 0x1F) + 3)?;
    }
    history.finish()
}

fn shade_price(candidate: Option<&Match>) -> u32 {
    if candidate.is_some() { 16 } else { 9 }
}

/// ShadeLZ with its size header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadeLz;

impl LzScheme for ShadeLz {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[SHADE_LZ_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        shade_price(candidate)
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let body = write_shade_body(Vec::new(), tokens);
        let mut output = Vec::with_capacity(body.len() + 8);
        output.write_u32::<LittleEndian>(size_field(input.len(), u32::MAX as u64)?)?;
        output.write_u32::<LittleEndian>(size_field(body.len(), u32::MAX as u64)?)?;
        output.extend(body);
        Ok(output)
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let body_size = cursor.read_u32::<LittleEndian>()? as usize;
        if 8 + body_size != input.len() {
            return Err(KompressionError::invalid_header(format!(
                "body size {body_size} does not match {} bytes of input",
                input.len() - 8
            )));
        }
        read_shade_body(region(input, 8, body_size)?, History::with_limit(size))
    }
}

/// ShadeLZ body without a header; decoding runs to the end of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadeLzHeaderless;

impl LzScheme for ShadeLzHeaderless {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&[SHADE_LZ_LIMITS])
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        shade_price(candidate)
    }

    fn serialize(&self, _input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        Ok(write_shade_body(Vec::new(), tokens))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        read_shade_body(input, History::new())
    }
}

/// PS-LZ match tiers: near, then far.
pub const PS_LZ_LIMITS: [FindLimits; 2] = [
    FindLimits::new(3, 0x42, 1, 0x100),
    FindLimits::new(3, 0x82, 1, 0x10000),
];

/// PS-LZ.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsLz;

impl LzScheme for PsLz {
    fn configure(&self) -> LzConfig {
        LzConfig::new(&PS_LZ_LIMITS)
    }

    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => 9,
            Some(m) if PS_LZ_LIMITS[0].accepts(m.displacement, m.length) => 16,
            Some(_) => 24,
        }
    }

    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>> {
        let mut header = Vec::with_capacity(4);
        header.write_u32::<LittleEndian>(size_field(input.len(), u32::MAX as u64)?)?;
        Ok(write_runs(header, tokens, 0x40, |n| (n - 1) as u8, |output, m| {
            let len = (m.length - 3) as u8;
            let disp = m.displacement - 1;
            if PS_LZ_LIMITS[0].accepts(m.displacement, m.length) {
                output.push(0x40 | len);
                output.push(disp as u8);
            } else {
                output.push(0x80 | len);
                output.extend_from_slice(&(disp as u16).to_le_bytes());
            }
        }))
    }

    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = cursor.read_u32::<LittleEndian>()? as usize;
        let mut body = Cursor::new(remaining(&cursor));

        let mut history = History::with_limit(size);
        while !history.is_full() {
            let code = body.read_u8()? as usize;
            let (length, disp) = match code >> 6 {
                0 => {
                    read_run(&mut body, &mut history, code + 1)?;
                    continue;
                }
                1 => (code & 0x3F, body.read_u8()? as usize),
                _ => (code & 0x7F, body.read_u16::<LittleEndian>()? as usize),
            };
            history.copy_match(disp + 1, length + 3)?;
        }
        history.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressOptions, Decoder, Encoder, LzCodec};

    const SAMPLE: &[u8] = b"abcabcabcabc";

    fn mixed() -> Vec<u8> {
        let mut data: Vec<u8> = (0..300u32).map(|i| (i * 31 % 251) as u8).collect();
        data.extend(b"the rain in spain ".repeat(40));
        data.extend(std::iter::repeat_n(0xAA, 700));
        data
    }

    #[test]
    fn test_lz_enc_stream() {
        let packed = LzCodec(LzEnc).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert_eq!(packed, [0x02, b'a', b'b', b'c', 0xE0, 0x00, 0x02]);
        assert_eq!(LzCodec(LzEnc).decode(&packed).unwrap(), SAMPLE);
    }

    #[test]
    fn test_lz_enc_long_runs() {
        let data = mixed();
        let packed = LzCodec(LzEnc).encode(&data, &CompressOptions::default()).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(LzCodec(LzEnc).decode(&packed).unwrap(), data);
        assert!(LzCodec(LzEnc).encode(b"", &CompressOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_shade_lz_stream() {
        let packed = LzCodec(ShadeLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert_eq!(
            packed,
            [12, 0, 0, 0, 6, 0, 0, 0, 0x02, b'a', b'b', b'c', 0x98, 0x02]
        );
        assert_eq!(LzCodec(ShadeLz).decode(&packed).unwrap(), SAMPLE);

        let bare = LzCodec(ShadeLzHeaderless)
            .encode(SAMPLE, &CompressOptions::default())
            .unwrap();
        assert_eq!(bare, packed[8..]);
        assert_eq!(LzCodec(ShadeLzHeaderless).decode(&bare).unwrap(), SAMPLE);
    }

    #[test]
    fn test_shade_lz_body_size_checked() {
        let mut packed = LzCodec(ShadeLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        packed.push(0);
        assert!(LzCodec(ShadeLz).decode(&packed).is_err());
    }

    #[test]
    fn test_ps_lz_tiers() {
        let packed = LzCodec(PsLz).encode(SAMPLE, &CompressOptions::default()).unwrap();
        assert_eq!(packed, [12, 0, 0, 0, 0x02, b'a', b'b', b'c', 0x46, 0x02]);

        // A far repeat needs the u16 displacement form.
        let mut data: Vec<u8> = (0..0x400u32).map(|i| (i * i * 73 >> 3) as u8).collect();
        let head = data[..0x80].to_vec();
        data.extend(head);
        let packed = LzCodec(PsLz).encode(&data, &CompressOptions::default()).unwrap();
        assert_eq!(LzCodec(PsLz).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_runs_roundtrip() {
        let data = mixed();
        for packed in [
            LzCodec(ShadeLz).encode(&data, &CompressOptions::default()).unwrap(),
            LzCodec(PsLz).encode(&data, &CompressOptions::default()).unwrap(),
        ] {
            assert!(packed.len() < data.len());
        }
        let packed = LzCodec(PsLz).encode(&data, &CompressOptions::default()).unwrap();
        assert_eq!(LzCodec(PsLz).decode(&packed).unwrap(), data);
        let packed = LzCodec(ShadeLz).encode(&data, &CompressOptions::default()).unwrap();
        assert_eq!(LzCodec(ShadeLz).decode(&packed).unwrap(), data);
    }

    #[test]
    fn test_match_before_start() {
        assert!(LzCodec(LzEnc).decode(&[0x20, 0x05]).is_err());
        assert!(LzCodec(PsLz).decode(&[4, 0, 0, 0, 0x41, 0x00]).is_err());
    }
}
