//! Huffman round-trips over all symbol layouts.

use kompression_huffman::{
    CanonicalDecoder, HuffmanTree, NibbleOrder, SymbolLayout, canonical_codes,
};
use kompression_core::{MsbBitReader, MsbBitWriter};
use proptest::prelude::*;

const LAYOUTS: [SymbolLayout; 3] = [
    SymbolLayout::Byte,
    SymbolLayout::Nibble(NibbleOrder::LowFirst),
    SymbolLayout::Nibble(NibbleOrder::HighFirst),
];

#[test]
fn test_skewed_distribution_compresses() {
    let mut data = vec![b'e'; 4000];
    data.extend(std::iter::repeat_n(b't', 500));
    data.extend((0..=255u8).cycle().take(300));

    let tree = HuffmanTree::from_data(&data, SymbolLayout::Byte).unwrap();
    let bits = tree.encode(&data, SymbolLayout::Byte).unwrap();
    assert!(bits.len() < data.len() / 3);
    assert_eq!(tree.code(b'e' as u16).map(|c| c.length), Some(1));
}

#[test]
fn test_deterministic_trees() {
    let data = b"mississippi river banks".repeat(5);
    let a = HuffmanTree::from_data(&data, SymbolLayout::Byte).unwrap();
    let b = HuffmanTree::from_data(&data, SymbolLayout::Byte).unwrap();
    assert_eq!(a.nodes(), b.nodes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tree_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2000)) {
        for layout in LAYOUTS {
            let tree = HuffmanTree::from_data(&data, layout).unwrap();
            let bits = tree.encode(&data, layout).unwrap();
            prop_assert_eq!(tree.decode(&bits, data.len(), layout).unwrap(), data.clone());
        }
    }

    #[test]
    fn prop_canonical_matches_tree_lengths(
        frequencies in proptest::collection::vec(0u32..1000, 2..300),
    ) {
        let tree = HuffmanTree::from_frequencies(&frequencies).unwrap();
        let lengths = tree.code_lengths();
        let codes = canonical_codes(&lengths).unwrap();
        let decoder = CanonicalDecoder::from_code_lengths(&lengths).unwrap();

        let symbols: Vec<u16> = (0..frequencies.len() as u16)
            .filter(|&s| lengths[s as usize] > 0)
            .collect();
        let mut writer = MsbBitWriter::new();
        for &s in &symbols {
            prop_assert_eq!(codes[s as usize].length, lengths[s as usize]);
            codes[s as usize].write_to(&mut writer);
        }
        let bits = writer.into_vec();
        let mut reader = MsbBitReader::new(&bits);
        for &s in &symbols {
            prop_assert_eq!(decoder.decode_msb(&mut reader).unwrap(), s);
        }
    }
}
