//! Format registry.
//!
//! Every format has a [`FormatId`] and one entry in [`FORMATS`], a read-only
//! table built at compile time. An entry holds factories for the encoder
//! and decoder, so looking a format up never allocates until a codec is
//! actually needed.
//!
//! Names are kebab-case (`yaz0-be`, `tales-of-03`). Parsing ignores case,
//! `-` and `_`, so `Yaz0BE` and `yaz0_be` resolve to the same format.

use crate::codec::{Decoder, Encoder, LzCodec};
use crate::formats::{
    backward::BackwardLz77,
    crilayla::Crilayla,
    deflate::Deflate,
    fixed::{Danganronpa3, IrLz, StingLz},
    level5::{Level5, Level5Method},
    lz4::Lz4Headerless,
    lz77::Lz77,
    lze::Lze,
    n64::{Mio0Be, Mio0Le, Yay0Be, Yay0Le, Yaz0Be, Yaz0Le},
    nintendo::{Lz10, Lz11, Lz40, Lz60},
    nintendo_huffman::NintendoHuffman,
    nintendo_rle::NintendoRle,
    ring::RingLzss,
    runs::{LzEnc, PsLz, ShadeLz, ShadeLzHeaderless},
    taiko::{TaikoLz80, TaikoLz81},
    vlc::LzssVlc,
    wp16::Wp16,
    zlib::ZLib,
};
use kompression_core::{KompressionError, Result};
use std::fmt;
use std::str::FromStr;

/// Identifies one wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatId {
    /// Nintendo LZ10.
    Lz10,
    /// Nintendo LZ11.
    Lz11,
    /// Nintendo LZ40.
    Lz40,
    /// Nintendo LZ60.
    Lz60,
    /// Level-5 LZ77.
    Lz77,
    /// 3DS backward LZ77.
    BackwardLz77,
    /// MIO0, little-endian.
    Mio0Le,
    /// MIO0, big-endian.
    Mio0Be,
    /// Yay0, little-endian.
    Yay0Le,
    /// Yay0, big-endian.
    Yay0Be,
    /// Yaz0, little-endian.
    Yaz0Le,
    /// Yaz0, big-endian.
    Yaz0Be,
    /// SSZL ring LZSS.
    Lzss,
    /// LZSS with variable-length integers.
    LzssVlc,
    /// Taiko LZ80.
    TaikoLz80,
    /// Taiko LZ81.
    TaikoLz81,
    /// WP16.
    Wp16,
    /// Tales of, type 01.
    TalesOf01,
    /// Tales of, type 03.
    TalesOf03,
    /// LZ-ECD.
    LzEcd,
    /// LZE.
    Lze,
    /// LZ-ENC.
    LzEnc,
    /// ShadeLZ.
    ShadeLz,
    /// ShadeLZ without a header.
    ShadeLzHeaderless,
    /// PS-LZ.
    PsLz,
    /// Raw Deflate.
    Deflate,
    /// ZLib.
    ZLib,
    /// IR-LZ.
    IrLz,
    /// CRI Layla.
    Crilayla,
    /// IECP.
    Iecp,
    /// LZ4 block without a frame.
    Lz4Headerless,
    /// Danganronpa 3.
    Danganronpa3,
    /// StingLZ.
    StingLz,
    /// Nintendo Huffman, 4-bit, low nibble first.
    Huffman4Le,
    /// Nintendo Huffman, 4-bit, high nibble first.
    Huffman4Be,
    /// Nintendo Huffman, 8-bit.
    Huffman8,
    /// Nintendo RLE.
    NintendoRle,
    /// Level-5 wrapped LZ10.
    Level5Lz10,
    /// Level-5 wrapped 4-bit Huffman.
    Level5Huffman4,
    /// Level-5 wrapped 8-bit Huffman.
    Level5Huffman8,
    /// Level-5 wrapped RLE.
    Level5Rle,
}

impl FormatId {
    /// Every format, in registry order.
    pub const ALL: [FormatId; 41] = [
        Self::Lz10,
        Self::Lz11,
        Self::Lz40,
        Self::Lz60,
        Self::Lz77,
        Self::BackwardLz77,
        Self::Mio0Le,
        Self::Mio0Be,
        Self::Yay0Le,
        Self::Yay0Be,
        Self::Yaz0Le,
        Self::Yaz0Be,
        Self::Lzss,
        Self::LzssVlc,
        Self::TaikoLz80,
        Self::TaikoLz81,
        Self::Wp16,
        Self::TalesOf01,
        Self::TalesOf03,
        Self::LzEcd,
        Self::Lze,
        Self::LzEnc,
        Self::ShadeLz,
        Self::ShadeLzHeaderless,
        Self::PsLz,
        Self::Deflate,
        Self::ZLib,
        Self::IrLz,
        Self::Crilayla,
        Self::Iecp,
        Self::Lz4Headerless,
        Self::Danganronpa3,
        Self::StingLz,
        Self::Huffman4Le,
        Self::Huffman4Be,
        Self::Huffman8,
        Self::NintendoRle,
        Self::Level5Lz10,
        Self::Level5Huffman4,
        Self::Level5Huffman8,
        Self::Level5Rle,
    ];

    /// Canonical kebab-case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lz10 => "lz10",
            Self::Lz11 => "lz11",
            Self::Lz40 => "lz40",
            Self::Lz60 => "lz60",
            Self::Lz77 => "lz77",
            Self::BackwardLz77 => "backward-lz77",
            Self::Mio0Le => "mio0-le",
            Self::Mio0Be => "mio0-be",
            Self::Yay0Le => "yay0-le",
            Self::Yay0Be => "yay0-be",
            Self::Yaz0Le => "yaz0-le",
            Self::Yaz0Be => "yaz0-be",
            Self::Lzss => "lzss",
            Self::LzssVlc => "lzss-vlc",
            Self::TaikoLz80 => "taiko-lz80",
            Self::TaikoLz81 => "taiko-lz81",
            Self::Wp16 => "wp16",
            Self::TalesOf01 => "tales-of-01",
            Self::TalesOf03 => "tales-of-03",
            Self::LzEcd => "lz-ecd",
            Self::Lze => "lze",
            Self::LzEnc => "lz-enc",
            Self::ShadeLz => "shade-lz",
            Self::ShadeLzHeaderless => "shade-lz-headerless",
            Self::PsLz => "ps-lz",
            Self::Deflate => "deflate",
            Self::ZLib => "zlib",
            Self::IrLz => "ir-lz",
            Self::Crilayla => "crilayla",
            Self::Iecp => "iecp",
            Self::Lz4Headerless => "lz4-headerless",
            Self::Danganronpa3 => "danganronpa3",
            Self::StingLz => "sting-lz",
            Self::Huffman4Le => "huffman4-le",
            Self::Huffman4Be => "huffman4-be",
            Self::Huffman8 => "huffman8",
            Self::NintendoRle => "nintendo-rle",
            Self::Level5Lz10 => "level5-lz10",
            Self::Level5Huffman4 => "level5-huffman4",
            Self::Level5Huffman8 => "level5-huffman8",
            Self::Level5Rle => "level5-rle",
        }
    }

    /// Registry entry of this format.
    pub fn entry(&self) -> Result<&'static FormatEntry> {
        lookup(*self)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(*c, '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for FormatId {
    type Err = KompressionError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|id| normalize(id.name()) == wanted)
            .ok_or_else(|| KompressionError::unsupported_format(s))
    }
}

/// One registry row.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    /// Format identifier.
    pub id: FormatId,
    /// Canonical name, same as [`FormatId::name`].
    pub name: &'static str,
    /// Where the format comes from.
    pub description: &'static str,
    /// Builds the encoder.
    pub encoder: fn() -> Box<dyn Encoder>,
    /// Builds the decoder.
    pub decoder: fn() -> Box<dyn Decoder>,
}

macro_rules! format_entry {
    ($id:ident, $description:literal, $codec:expr) => {
        FormatEntry {
            id: FormatId::$id,
            name: FormatId::$id.name(),
            description: $description,
            encoder: || Box::new($codec),
            decoder: || Box::new($codec),
        }
    };
}

/// The registry, in [`FormatId::ALL`] order.
pub static FORMATS: &[FormatEntry] = &[
    format_entry!(Lz10, "Nintendo GBA/DS BIOS LZ77", LzCodec(Lz10)),
    format_entry!(Lz11, "Nintendo DS LZ with extended lengths", LzCodec(Lz11)),
    format_entry!(Lz40, "Nintendo DS LZ with little-endian match words", LzCodec(Lz40::default())),
    format_entry!(Lz60, "LZ40 under type byte 0x60", LzCodec(Lz60::default())),
    format_entry!(Lz77, "Level-5 LZ77, one literal after every match", LzCodec(Lz77)),
    format_entry!(BackwardLz77, "3DS code binaries, decoded back to front", LzCodec(BackwardLz77)),
    format_entry!(Mio0Le, "Nintendo 64 MIO0, little-endian", LzCodec(Mio0Le::default())),
    format_entry!(Mio0Be, "Nintendo 64 MIO0, big-endian", LzCodec(Mio0Be::default())),
    format_entry!(Yay0Le, "Nintendo Yay0, little-endian", LzCodec(Yay0Le::default())),
    format_entry!(Yay0Be, "Nintendo Yay0, big-endian", LzCodec(Yay0Be::default())),
    format_entry!(Yaz0Le, "Nintendo Yaz0, little-endian", LzCodec(Yaz0Le::default())),
    format_entry!(Yaz0Be, "Nintendo Yaz0, big-endian", LzCodec(Yaz0Be::default())),
    format_entry!(Lzss, "SSZL ring-buffer LZSS", LzCodec(RingLzss::LZSS)),
    format_entry!(LzssVlc, "LZSS with variable-length integers", LzCodec(LzssVlc)),
    format_entry!(TaikoLz80, "Taiko no Tatsujin LZ80, three match tiers", LzCodec(TaikoLz80)),
    format_entry!(TaikoLz81, "Taiko no Tatsujin LZ81, LZ with Huffman", LzCodec(TaikoLz81)),
    format_entry!(Wp16, "16-bit unit LZ", LzCodec(Wp16)),
    format_entry!(TalesOf01, "Tales of, ring LZSS type 01", LzCodec(RingLzss::TALES_OF_01)),
    format_entry!(TalesOf03, "Tales of, ring LZSS with runs, type 03", LzCodec(RingLzss::TALES_OF_03)),
    format_entry!(LzEcd, "ECD ring LZSS, 1 KiB window", LzCodec(RingLzss::LZ_ECD)),
    format_entry!(Lze, "LZE, 2-bit codes with two match tiers", LzCodec(Lze)),
    format_entry!(LzEnc, "Headerless LZ with literal runs", LzCodec(LzEnc)),
    format_entry!(ShadeLz, "Shade LZ with size header", LzCodec(ShadeLz)),
    format_entry!(ShadeLzHeaderless, "Shade LZ body only", LzCodec(ShadeLzHeaderless)),
    format_entry!(PsLz, "PS LZ with run, short and long codes", LzCodec(PsLz)),
    format_entry!(Deflate, "Raw Deflate (RFC 1951)", LzCodec(Deflate)),
    format_entry!(ZLib, "ZLib (RFC 1950)", LzCodec(ZLib)),
    format_entry!(IrLz, "IR LZ with 16-bit flag groups", LzCodec(IrLz)),
    format_entry!(Crilayla, "CRI middleware Layla", LzCodec(Crilayla)),
    format_entry!(Iecp, "IECP ring LZSS", LzCodec(RingLzss::IECP)),
    format_entry!(Lz4Headerless, "LZ4 block without a frame", LzCodec(Lz4Headerless)),
    format_entry!(Danganronpa3, "Danganronpa V3 LZ", LzCodec(Danganronpa3)),
    format_entry!(StingLz, "Sting LZ with big-endian flags", LzCodec(StingLz)),
    format_entry!(Huffman4Le, "Nintendo Huffman, 4-bit, low nibble first", NintendoHuffman::HUFFMAN4_LE),
    format_entry!(Huffman4Be, "Nintendo Huffman, 4-bit, high nibble first", NintendoHuffman::HUFFMAN4_BE),
    format_entry!(Huffman8, "Nintendo Huffman, 8-bit", NintendoHuffman::HUFFMAN8),
    format_entry!(NintendoRle, "Nintendo run-length encoding", NintendoRle),
    format_entry!(Level5Lz10, "Level-5 header over LZ10", Level5::new(Level5Method::Lz10)),
    format_entry!(Level5Huffman4, "Level-5 header over 4-bit Huffman", Level5::new(Level5Method::Huffman4)),
    format_entry!(Level5Huffman8, "Level-5 header over 8-bit Huffman", Level5::new(Level5Method::Huffman8)),
    format_entry!(Level5Rle, "Level-5 header over RLE", Level5::new(Level5Method::Rle)),
];

/// Registry entry for `id`.
pub fn lookup(id: FormatId) -> Result<&'static FormatEntry> {
    FORMATS
        .iter()
        .find(|entry| entry.id == id)
        .ok_or_else(|| KompressionError::unsupported_format(id.name()))
}

/// Registry entry for a format name.
pub fn lookup_name(name: &str) -> Result<&'static FormatEntry> {
    lookup(name.parse()?)
}
