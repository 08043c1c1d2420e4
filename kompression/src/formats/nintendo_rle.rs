//! Nintendo RLE (type 0x30).
//!
//! After the N32 header the body is a sequence of blocks. A block byte with
//! bit 7 set is a run of `(b & 0x7F) + 3` copies of the next byte; otherwise
//! `(b & 0x7F) + 1` raw bytes follow.

use super::nintendo::{read_header, write_header};
use super::remaining;
use crate::codec::{CompressOptions, Decoder, Encoder};
use byteorder::ReadBytesExt;
use kompression_core::{History, Result};
use std::io::{Cursor, Read};

const MIN_RUN: usize = 3;
const MAX_RUN: usize = 0x82;
const MAX_RAW: usize = 0x80;

/// Nintendo RLE codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct NintendoRle;

impl NintendoRle {
    pub(crate) fn encode_body(mut output: Vec<u8>, input: &[u8]) -> Vec<u8> {
        let mut raw_start = 0;
        let mut i = 0;
        while i < input.len() {
            let run = input[i..]
                .iter()
                .take(MAX_RUN)
                .take_while(|&&b| b == input[i])
                .count();
            if run >= MIN_RUN {
                push_raw(&mut output, &input[raw_start..i]);
                output.push(0x80 | (run - MIN_RUN) as u8);
                output.push(input[i]);
                i += run;
                raw_start = i;
            } else {
                i += 1;
            }
        }
        push_raw(&mut output, &input[raw_start..]);
        output
    }

    pub(crate) fn decode_body(body: &[u8], size: usize) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(body);
        let mut history = History::with_limit(size);
        let mut raw = [0u8; MAX_RAW];
        while !history.is_full() {
            let block = cursor.read_u8()?;
            if block & 0x80 != 0 {
                let value = cursor.read_u8()?;
                history.fill(value, (block & 0x7F) as usize + MIN_RUN)?;
            } else {
                let raw = &mut raw[..(block & 0x7F) as usize + 1];
                cursor.read_exact(raw)?;
                history.extend_from_slice(raw)?;
            }
        }
        history.finish()
    }
}

fn push_raw(output: &mut Vec<u8>, raw: &[u8]) {
    for chunk in raw.chunks(MAX_RAW) {
        output.push((chunk.len() - 1) as u8);
        output.extend_from_slice(chunk);
    }
}

impl Encoder for NintendoRle {
    fn encode(&self, input: &[u8], _options: &CompressOptions) -> Result<Vec<u8>> {
        Ok(Self::encode_body(write_header(0x30, input.len())?, input))
    }
}

impl Decoder for NintendoRle {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(input);
        let size = read_header(&mut cursor, 0x30)?;
        Self::decode_body(remaining(&cursor), size)
    }
}
