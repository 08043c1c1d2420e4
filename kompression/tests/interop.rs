//! The standard formats must be readable by, and read, the reference
//! implementations: zlib (through flate2) and liblz4.

use flate2::Compression;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use kompression::{FormatId, compress, decompress};
use std::io::{Read, Write};

fn samples() -> Vec<Vec<u8>> {
    let mut mixed = Vec::new();
    let mut state = 0x2545_F491u32;
    for i in 0..6000u32 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        if i % 7 < 3 {
            mixed.push((state >> 24) as u8);
        } else {
            mixed.extend_from_slice(b"tile");
        }
    }
    vec![
        b"x".to_vec(),
        b"AB".repeat(16),
        b"hello ".repeat(6),
        b"abcabcabcabc".to_vec(),
        vec![0u8; 1000],
        b"Kompression keeps the reference decoders happy. ".repeat(40),
        mixed,
    ]
}

#[test]
fn test_deflate_read_by_zlib() {
    for data in samples() {
        let packed = compress(FormatId::Deflate, &data).unwrap();
        let mut unpacked = Vec::new();
        DeflateDecoder::new(&packed[..])
            .read_to_end(&mut unpacked)
            .unwrap();
        assert_eq!(unpacked, data);
    }
}

#[test]
fn test_zlib_read_by_zlib() {
    for data in samples() {
        let packed = compress(FormatId::ZLib, &data).unwrap();
        let mut unpacked = Vec::new();
        ZlibDecoder::new(&packed[..])
            .read_to_end(&mut unpacked)
            .unwrap();
        assert_eq!(unpacked, data);
    }
}

#[test]
fn test_reads_zlib_output() {
    for level in [Compression::none(), Compression::fast(), Compression::best()] {
        for data in samples() {
            let mut encoder = DeflateEncoder::new(Vec::new(), level);
            encoder.write_all(&data).unwrap();
            let raw = encoder.finish().unwrap();
            assert_eq!(decompress(FormatId::Deflate, &raw, Some(data.len())).unwrap(), data);

            let mut encoder = ZlibEncoder::new(Vec::new(), level);
            encoder.write_all(&data).unwrap();
            let wrapped = encoder.finish().unwrap();
            assert_eq!(decompress(FormatId::ZLib, &wrapped, Some(data.len())).unwrap(), data);
        }
    }
}

#[test]
fn test_lz4_read_by_liblz4() {
    for data in samples() {
        let packed = compress(FormatId::Lz4Headerless, &data).unwrap();
        let unpacked = lz4::block::decompress(&packed, Some(data.len() as i32))
            .unwrap_or_else(|e| panic!("{} bytes rejected: {e}", data.len()));
        assert_eq!(unpacked, data);
    }
}

#[test]
fn test_reads_liblz4_output() {
    for data in samples() {
        let packed = lz4::block::compress(&data, None, false).unwrap();
        assert_eq!(
            decompress(FormatId::Lz4Headerless, &packed, Some(data.len())).unwrap(),
            data
        );
    }
}
