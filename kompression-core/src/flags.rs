//! Flag groups for LZ token streams.
//!
//! Most LZ variants announce the kind of each upcoming token with a flag bit
//! collected into 8, 16 or 32 bit groups. The writer reserves a placeholder
//! for each group at the point where its first flag is emitted and patches it
//! as bits arrive, so token payloads can be appended to the same buffer
//! between flags:
//!
//! ```text
//! [flags 0..8][payload 0][payload 1]...[payload 7][flags 8..16][payload 8]...
//! ```
//!
//! Formats that keep flags in a separate region (MIO0, Yay0) simply use a
//! dedicated writer and never push payload bytes into it.

use crate::error::Result;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Read;

/// Order in which flags fill a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// First flag in the most significant bit.
    MsbFirst,
    /// First flag in the least significant bit.
    LsbFirst,
}

/// Byte order of multi-byte flag groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Little endian.
    Little,
    /// Big endian.
    Big,
}

/// Shape of one flag group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagLayout {
    /// Group size in bytes (1, 2 or 4).
    pub bytes: usize,
    /// Fill order.
    pub order: BitOrder,
    /// Byte order for multi-byte groups.
    pub endian: Endian,
}

impl FlagLayout {
    /// One byte, most significant flag first.
    pub const BYTE_MSB: Self = Self {
        bytes: 1,
        order: BitOrder::MsbFirst,
        endian: Endian::Little,
    };

    /// One byte, least significant flag first.
    pub const BYTE_LSB: Self = Self {
        bytes: 1,
        order: BitOrder::LsbFirst,
        endian: Endian::Little,
    };

    /// Create a layout.
    pub const fn new(bytes: usize, order: BitOrder, endian: Endian) -> Self {
        Self {
            bytes,
            order,
            endian,
        }
    }

    /// Number of flags per group.
    pub const fn bits(&self) -> u32 {
        (self.bytes * 8) as u32
    }

    fn store(&self, value: u32, slot: &mut [u8]) {
        match self.endian {
            Endian::Little => {
                for (i, byte) in slot.iter_mut().enumerate() {
                    *byte = (value >> (8 * i)) as u8;
                }
            }
            Endian::Big => {
                let n = slot.len();
                for (i, byte) in slot.iter_mut().enumerate() {
                    *byte = (value >> (8 * (n - 1 - i))) as u8;
                }
            }
        }
    }

    fn load<R: Read>(&self, reader: &mut R) -> Result<u32> {
        Ok(match (self.bytes, self.endian) {
            (1, _) => reader.read_u8()? as u32,
            (2, Endian::Little) => reader.read_u16::<LittleEndian>()? as u32,
            (2, Endian::Big) => reader.read_u16::<BigEndian>()? as u32,
            (_, Endian::Little) => reader.read_u32::<LittleEndian>()?,
            (_, Endian::Big) => reader.read_u32::<BigEndian>()?,
        })
    }
}

/// Output buffer with interleaved, patched flag groups.
#[derive(Debug, Clone)]
pub struct FlagWriter {
    layout: FlagLayout,
    output: Vec<u8>,
    /// Offset of the current group's placeholder.
    slot: usize,
    value: u32,
    used: u32,
}

impl FlagWriter {
    /// Create a writer with an empty output buffer.
    pub fn new(layout: FlagLayout) -> Self {
        Self::with_output(layout, Vec::new())
    }

    /// Create a writer appending to an existing buffer (e.g. after a header).
    pub fn with_output(layout: FlagLayout, output: Vec<u8>) -> Self {
        Self {
            layout,
            output,
            slot: 0,
            value: 0,
            used: layout.bits(),
        }
    }

    /// Emit one flag.
    pub fn write_flag(&mut self, flag: bool) {
        if self.used == self.layout.bits() {
            self.slot = self.output.len();
            self.output.resize(self.slot + self.layout.bytes, 0);
            self.value = 0;
            self.used = 0;
        }

        if flag {
            let shift = match self.layout.order {
                BitOrder::MsbFirst => self.layout.bits() - 1 - self.used,
                BitOrder::LsbFirst => self.used,
            };
            self.value |= 1 << shift;
        }
        self.used += 1;

        let end = self.slot + self.layout.bytes;
        self.layout.store(self.value, &mut self.output[self.slot..end]);
    }

    /// Emit a multi-bit code. The code reads naturally in the group: its most
    /// significant bit comes first for MSB-first groups and last otherwise.
    pub fn write_flags(&mut self, value: u32, count: u32) {
        match self.layout.order {
            BitOrder::MsbFirst => {
                for i in (0..count).rev() {
                    self.write_flag((value >> i) & 1 != 0);
                }
            }
            BitOrder::LsbFirst => {
                for i in 0..count {
                    self.write_flag((value >> i) & 1 != 0);
                }
            }
        }
    }

    /// Append a payload byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Append payload bytes.
    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    /// Bytes written so far, including placeholders.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Mutable access to the output, e.g. to patch a header field.
    pub fn output_mut(&mut self) -> &mut Vec<u8> {
        &mut self.output
    }

    /// Finish and return the buffer.
    pub fn finish(self) -> Vec<u8> {
        self.output
    }
}

/// Reader for flag groups, pulling group words from a byte source on demand.
#[derive(Debug, Clone)]
pub struct FlagReader {
    layout: FlagLayout,
    value: u32,
    left: u32,
}

impl FlagReader {
    /// Create a reader.
    pub fn new(layout: FlagLayout) -> Self {
        Self {
            layout,
            value: 0,
            left: 0,
        }
    }

    /// Read the next flag, loading a new group from `reader` when needed.
    pub fn read_flag<R: Read>(&mut self, reader: &mut R) -> Result<bool> {
        if self.left == 0 {
            self.value = self.layout.load(reader)?;
            self.left = self.layout.bits();
        }

        let shift = match self.layout.order {
            BitOrder::MsbFirst => self.left - 1,
            BitOrder::LsbFirst => self.layout.bits() - self.left,
        };
        self.left -= 1;
        Ok((self.value >> shift) & 1 != 0)
    }

    /// Read a multi-bit code written by [`FlagWriter::write_flags`].
    pub fn read_flags<R: Read>(&mut self, reader: &mut R, count: u32) -> Result<u32> {
        let mut value = 0;
        for i in 0..count {
            let bit = self.read_flag(reader)? as u32;
            value = match self.layout.order {
                BitOrder::MsbFirst => (value << 1) | bit,
                BitOrder::LsbFirst => value | (bit << i),
            };
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_msb_byte_interleaved() {
        let mut writer = FlagWriter::new(FlagLayout::BYTE_MSB);
        writer.write_flag(false);
        writer.push(b'A');
        writer.write_flag(true);
        writer.extend_from_slice(&[0x10, 0x01]);
        let out = writer.finish();
        assert_eq!(out, vec![0x40, b'A', 0x10, 0x01]);
    }

    #[test]
    fn test_new_group_after_full() {
        let mut writer = FlagWriter::new(FlagLayout::BYTE_LSB);
        for _ in 0..8 {
            writer.write_flag(true);
            writer.push(0);
        }
        writer.write_flag(true);
        let out = writer.finish();
        assert_eq!(out.len(), 1 + 8 + 1);
        assert_eq!(out[0], 0xFF);
        assert_eq!(out[9], 0x01);
    }

    #[test]
    fn test_wide_groups_roundtrip() {
        for layout in [
            FlagLayout::new(2, BitOrder::MsbFirst, Endian::Big),
            FlagLayout::new(2, BitOrder::LsbFirst, Endian::Little),
            FlagLayout::new(4, BitOrder::MsbFirst, Endian::Big),
            FlagLayout::new(4, BitOrder::LsbFirst, Endian::Little),
        ] {
            let pattern: Vec<bool> = (0..45).map(|i| i % 3 == 0 || i % 7 == 0).collect();
            let mut writer = FlagWriter::new(layout);
            for &flag in &pattern {
                writer.write_flag(flag);
            }
            let out = writer.finish();

            let mut cursor = Cursor::new(out.as_slice());
            let mut reader = FlagReader::new(layout);
            for &flag in &pattern {
                assert_eq!(reader.read_flag(&mut cursor).unwrap(), flag);
            }
        }
    }

    #[test]
    fn test_two_bit_codes() {
        let mut writer = FlagWriter::new(FlagLayout::BYTE_LSB);
        for code in [2, 0, 3, 1] {
            writer.write_flags(code, 2);
        }
        let out = writer.finish();
        assert_eq!(out, vec![0b01_11_00_10]);

        let mut cursor = Cursor::new(out.as_slice());
        let mut reader = FlagReader::new(FlagLayout::BYTE_LSB);
        for code in [2, 0, 3, 1] {
            assert_eq!(reader.read_flags(&mut cursor, 2).unwrap(), code);
        }
    }

    #[test]
    fn test_reader_eof() {
        let mut cursor = Cursor::new(&[][..]);
        let mut reader = FlagReader::new(FlagLayout::BYTE_MSB);
        assert!(reader.read_flag(&mut cursor).is_err());
    }
}
