//! Command implementations for the Kompression CLI.

pub mod compress;
pub mod decompress;
pub mod formats;
pub mod verify;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use formats::cmd_formats;
pub use verify::cmd_verify;
