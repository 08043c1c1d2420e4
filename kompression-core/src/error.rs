//! Error types for Kompression operations.
//!
//! A single error type covers the three failure families of the engine:
//! configuration errors raised while compressing (bad constraint sets,
//! windows a strategy cannot serve), malformed input raised while
//! decompressing, and lookup failures in the format registry.

use std::io;
use thiserror::Error;

/// Every failure the Kompression crates report.
#[derive(Debug, Error)]
pub enum KompressionError {
    /// Truncated input or a failing byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid match constraints or codec configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// The match window cannot cover the data for the chosen strategy.
    #[error("Unsupported window: {window} bytes cannot cover {required} bytes of input")]
    UnsupportedWindow {
        /// Maximum displacement of the constraint set.
        window: usize,
        /// Window size the strategy needs.
        required: usize,
    },

    /// Header magic does not belong to the format.
    #[error("Bad magic: wanted {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Magic the format requires.
        expected: Vec<u8>,
        /// Bytes at the start of the input.
        found: Vec<u8>,
    },

    /// Header field out of range.
    #[error("Bad header: {message}")]
    InvalidHeader {
        /// What is wrong with it.
        message: String,
    },

    /// Compressed data that cannot be decoded.
    #[error("Malformed input at offset {offset}: {message}")]
    MalformedInput {
        /// Byte offset in the compressed input where the problem was detected.
        offset: u64,
        /// Description of the problem.
        message: String,
    },

    /// Back-reference pointing before the start of the output.
    #[error("Back-reference of {distance} bytes reaches before the output start ({history_size} bytes decoded)")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes available behind the write position.
        history_size: usize,
    },

    /// A bit stream ran out of data.
    #[error("Input ends {expected} bits early")]
    UnexpectedEof {
        /// Bits still needed.
        expected: usize,
    },

    /// Declared or expected output length disagrees with the decoded data.
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Declared or expected size.
        expected: usize,
        /// Size actually produced.
        actual: usize,
    },

    /// Stored checksum does not match the decoded data.
    #[error("Checksum mismatch: expected {expected:#x}, computed {computed:#x}")]
    ChecksumMismatch {
        /// Checksum stored in the stream.
        expected: u32,
        /// Checksum computed from the output.
        computed: u32,
    },

    /// Bit pattern that matches no Huffman code.
    #[error("No Huffman code matches at bit {bit_position}")]
    InvalidHuffmanCode {
        /// Where the code starts.
        bit_position: u64,
    },

    /// No codec is registered under the requested name.
    #[error("Unsupported format: {name}")]
    UnsupportedFormat {
        /// The requested format name.
        name: String,
    },

    /// A stream feature this library does not implement.
    #[error("Unimplemented: {feature}")]
    Unimplemented {
        /// Name of the feature.
        feature: String,
    },

    /// The operation was cancelled through its cancellation flag.
    #[error("Operation cancelled")]
    Cancelled,
}

/// `Result` with [`KompressionError`].
pub type Result<T> = std::result::Result<T, KompressionError>;

impl KompressionError {
    /// [`KompressionError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// [`KompressionError::UnsupportedWindow`].
    pub fn unsupported_window(window: usize, required: usize) -> Self {
        Self::UnsupportedWindow { window, required }
    }

    /// [`KompressionError::InvalidMagic`].
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// [`KompressionError::InvalidHeader`].
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// [`KompressionError::MalformedInput`].
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            message: message.into(),
        }
    }

    /// [`KompressionError::InvalidDistance`].
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// [`KompressionError::UnexpectedEof`].
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// [`KompressionError::SizeMismatch`].
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// [`KompressionError::ChecksumMismatch`].
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// [`KompressionError::InvalidHuffmanCode`].
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// [`KompressionError::UnsupportedFormat`].
    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat { name: name.into() }
    }

    /// [`KompressionError::Unimplemented`].
    pub fn unimplemented(feature: impl Into<String>) -> Self {
        Self::Unimplemented {
            feature: feature.into(),
        }
    }

    /// Whether the error was raised while validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::UnsupportedWindow { .. }
        )
    }
}
