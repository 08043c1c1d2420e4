//! MSB-first bit I/O.
//!
//! The Nintendo Huffman formats, CRILAYLA and the hybrid LZ variants fill
//! each byte from bit 7 downwards; a multi-bit field keeps its most
//! significant bit first. Deflate's opposite order lives in
//! [`crate::bitstream`].

use crate::error::{KompressionError, Result};

/// MSB-first reader over a byte slice.
///
/// Addresses the slice by bit index, so it never holds bytes it has not
/// handed out yet.
#[derive(Debug, Clone)]
pub struct MsbBitReader<'a> {
    data: &'a [u8],
    cursor: u64,
}

impl<'a> MsbBitReader<'a> {
    /// Reader starting at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Read a field of `count` bits (at most 32). The first bit read ends
    /// up as the most significant bit of the result.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32);
        let available = self.bits_remaining();
        if (count as u64) > available {
            return Err(KompressionError::unexpected_eof(
                (count as u64 - available) as usize,
            ));
        }

        let mut value = 0u32;
        let mut left = count as u32;
        while left > 0 {
            let byte = self.data[(self.cursor / 8) as usize];
            let offset = (self.cursor % 8) as u32;
            let take = left.min(8 - offset);
            let chunk = (byte << offset) >> (8 - take);
            // Shifting a u32 by 32 overflows, so widen.
            value = ((value as u64) << take) as u32 | chunk as u32;
            left -= take;
            self.cursor += take as u64;
        }
        Ok(value)
    }

    /// Read one bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self
            .data
            .get((self.cursor / 8) as usize)
            .ok_or_else(|| KompressionError::unexpected_eof(1))?;
        let bit = byte & (0x80 >> (self.cursor % 8)) != 0;
        self.cursor += 1;
        Ok(bit)
    }

    /// Bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.cursor
    }

    /// Bits not yet consumed.
    pub fn bits_remaining(&self) -> u64 {
        self.data.len() as u64 * 8 - self.cursor
    }
}

/// MSB-first writer producing a `Vec<u8>`.
#[derive(Debug, Default, Clone)]
pub struct MsbBitWriter {
    bytes: Vec<u8>,
    /// Bits of the last byte in `bytes` already in use, 0 when it is full.
    used: u8,
}

impl MsbBitWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `count` bits of `value` (at most 32), most
    /// significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    /// Write one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if self.used == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> self.used;
            }
        }
        self.used = (self.used + 1) % 8;
    }

    /// Bits written so far, padding excluded.
    pub fn bit_len(&self) -> u64 {
        match self.used {
            0 => self.bytes.len() as u64 * 8,
            used => (self.bytes.len() as u64 - 1) * 8 + used as u64,
        }
    }

    /// Zero-pad the last byte.
    pub fn align_to_byte(&mut self) {
        self.used = 0;
    }

    /// The packed bytes, last one zero-padded.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}
