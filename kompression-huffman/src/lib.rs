//! # Kompression Huffman
//!
//! Huffman coding used standalone (Nintendo Huffman formats) and as the
//! entropy stage of hybrid LZ formats.
//!
//! - [`tree`]: trees built from symbol frequencies
//! - [`canonical`]: canonical codes rebuilt from code lengths (Deflate)
//! - [`symbols`]: 4-bit and 8-bit symbol layouts
//!
//! ## Example
//!
//! ```rust
//! use kompression_huffman::{HuffmanTree, SymbolLayout};
//!
//! let data = b"abracadabra";
//! let tree = HuffmanTree::from_data(data, SymbolLayout::Byte).unwrap();
//! let bits = tree.encode(data, SymbolLayout::Byte).unwrap();
//! assert_eq!(tree.decode(&bits, data.len(), SymbolLayout::Byte).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod canonical;
pub mod symbols;
pub mod tree;

pub use canonical::{CanonicalDecoder, canonical_codes};
pub use symbols::{NibbleOrder, SymbolLayout};
pub use tree::{Code, HuffmanNode, HuffmanTree, MAX_TREE_DEPTH};
