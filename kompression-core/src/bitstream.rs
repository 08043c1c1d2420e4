//! LSB-first bit I/O.
//!
//! Deflate (and therefore ZLib) fills each byte from bit 0 upwards, and
//! multi-bit fields are stored least significant bit first:
//!
//! ```text
//! byte 0: 7 6 5 4 3 2 1 0   byte 1: 15 14 13 12 11 10 9 8
//!         └── later bits    first bit ┘
//! ```
//!
//! Huffman codes in Deflate are the exception: they are packed starting
//! from their most significant bit, which callers handle by reversing the
//! code before [`BitWriter::write_bits`] or by reading one bit at a time.
//! Formats that pack whole streams MSB first use [`crate::bitstream_msb`].
//!
//! # Example
//!
//! ```
//! use kompression_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b1100, 4).unwrap();
//! let bytes = writer.into_inner().unwrap();
//! assert_eq!(bytes, [0b0110_0101]);
//!
//! let mut reader = BitReader::new(Cursor::new(&bytes));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{KompressionError, Result};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Write};

/// LSB-first reader over any byte source.
///
/// Bytes are pulled one at a time, only when the requested field needs
/// them, so the source is never read past the last byte touched. That
/// keeps byte-aligned data after the bit stream (the ZLib trailer)
/// readable through [`BitReader::read_bytes`].
#[derive(Debug)]
pub struct BitReader<R: Read> {
    source: R,
    /// Unconsumed bits, next bit in bit 0.
    pending: u64,
    pending_len: u32,
    consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Reader over `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            pending: 0,
            pending_len: 0,
            consumed: 0,
        }
    }

    /// The byte source. Bits already pulled into the reader are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.consumed
    }

    fn pull_byte(&mut self, missing: u32) -> Result<()> {
        let byte = self.source.read_u8().map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => KompressionError::unexpected_eof(missing as usize),
            _ => e.into(),
        })?;
        self.pending |= (byte as u64) << self.pending_len;
        self.pending_len += 8;
        Ok(())
    }

    /// Read a field of `count` bits (at most 32).
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        let count = count as u32;
        debug_assert!(count <= 32);
        while self.pending_len < count {
            self.pull_byte(count - self.pending_len)?;
        }

        let value = self.pending & ((1u64 << count) - 1);
        self.pending >>= count;
        self.pending_len -= count;
        self.consumed += count as u64;
        Ok(value as u32)
    }

    /// Read one bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Skip to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let skip = self.pending_len % 8;
        self.pending >>= skip;
        self.pending_len -= skip;
        self.consumed += skip as u64;
    }

    /// Fill `buf` with whole bytes. Call [`BitReader::align_to_byte`] first.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(self.pending_len % 8, 0);
        let buffered = (self.pending_len / 8) as usize;
        let (head, rest) = buf.split_at_mut(buffered.min(buf.len()));
        for byte in head {
            *byte = self.pending as u8;
            self.pending >>= 8;
            self.pending_len -= 8;
        }
        self.source.read_exact(rest).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => KompressionError::unexpected_eof(rest.len() * 8),
            _ => e.into(),
        })?;
        self.consumed += buf.len() as u64 * 8;
        Ok(())
    }
}

/// LSB-first writer into any byte sink.
///
/// Whole bytes go to the sink as soon as they are complete; the last
/// partial byte is zero-padded by [`BitWriter::flush`] or
/// [`BitWriter::into_inner`].
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    sink: W,
    pending: u64,
    pending_len: u32,
    written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Writer into `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            pending: 0,
            pending_len: 0,
            written: 0,
        }
    }

    /// Pad, flush and return the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    /// Bits written so far, padding included.
    pub fn bits_written(&self) -> u64 {
        self.written
    }

    /// Write the low `count` bits of `value` (at most 32).
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        let count = count as u32;
        debug_assert!(count <= 32);
        let field = value as u64 & ((1u64 << count) - 1);
        self.pending |= field << self.pending_len;
        self.pending_len += count;
        self.written += count as u64;

        while self.pending_len >= 8 {
            self.sink.write_u8(self.pending as u8)?;
            self.pending >>= 8;
            self.pending_len -= 8;
        }
        Ok(())
    }

    /// Write one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Zero-pad to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        match self.pending_len % 8 {
            0 => Ok(()),
            used => self.write_bits(0, (8 - used) as u8),
        }
    }

    /// Pad the last byte and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Pad to a byte boundary, then write `buf` as is.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.align_to_byte()?;
        self.sink.write_all(buf)?;
        self.written += buf.len() as u64 * 8;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bit_order() {
        let mut reader = BitReader::new(Cursor::new([0xB5u8]));
        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(
            bits,
            [true, false, true, false, true, true, false, true]
        );
        assert_eq!(reader.bit_position(), 8);
    }

    #[test]
    fn test_fields_span_bytes() {
        let mut reader = BitReader::new(Cursor::new([0xFFu8, 0x00]));
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F);
        assert_eq!(reader.read_bits(4).unwrap(), 0);

        let mut reader = BitReader::new(Cursor::new([0x78u8, 0x56, 0x34, 0x12, 0xFF]));
        reader.read_bits(4).unwrap();
        assert_eq!(reader.read_bits(32).unwrap(), 0xF123_4567);
    }

    #[test]
    fn test_eof_reports_missing_bits() {
        let mut reader = BitReader::new(Cursor::new([0x01u8]));
        reader.read_bits(6).unwrap();
        assert!(matches!(
            reader.read_bits(4),
            Err(KompressionError::UnexpectedEof { expected: 2 })
        ));
    }

    #[test]
    fn test_writer_packs_lsb_first() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11001, 5).unwrap();
        writer.write_bit(true).unwrap();
        assert_eq!(writer.bits_written(), 9);
        assert_eq!(writer.into_inner().unwrap(), [0xCD, 0x01]);
    }

    #[test]
    fn test_bytes_after_bits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bytes(&[0x12, 0x34]).unwrap();
        let output = writer.into_inner().unwrap();
        assert_eq!(output, [0x03, 0x12, 0x34]);

        let mut reader = BitReader::new(Cursor::new(&output));
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        reader.align_to_byte();
        let mut buf = [0u8; 2];
        reader.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
        assert!(reader.read_bytes(&mut buf[..1]).is_err());
    }
}
