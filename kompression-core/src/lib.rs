//! # Kompression Core
//!
//! Core components shared by the Kompression crates.
//!
//! - [`bitstream`]: LSB-first bit I/O (Deflate)
//! - [`bitstream_msb`]: MSB-first bit I/O (Huffman formats, CRILAYLA, hybrid LZ)
//! - [`flags`]: flag groups interleaved with LZ token payloads
//! - [`history`]: decode output doubling as the back-reference window
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: API                                                 │
//! │     Format registry, compress/decompress, CLI           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Codec variants                                      │
//! │     LZ10/11, Yaz0, MIO0, LZSS, Deflate, CRILAYLA, ...   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Engine                                              │
//! │     Match finders, optimal parser, Huffman trees        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     Bit streams, flag groups, history, errors           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kompression_core::history::History;
//!
//! let mut history = History::new();
//! history.extend_from_slice(b"AB").unwrap();
//! history.copy_match(2, 8).unwrap();
//! assert_eq!(history.output(), b"ABABABABAB");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod bitstream_msb;
pub mod error;
pub mod flags;
pub mod history;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use bitstream_msb::{MsbBitReader, MsbBitWriter};
pub use error::{KompressionError, Result};
pub use flags::{BitOrder, Endian, FlagLayout, FlagReader, FlagWriter};
pub use history::History;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream_msb::{MsbBitReader, MsbBitWriter};
    pub use crate::error::{KompressionError, Result};
    pub use crate::flags::{FlagLayout, FlagReader, FlagWriter};
    pub use crate::history::History;
}
