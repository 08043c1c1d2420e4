//! Decompress command implementation.

use crate::utils::{decompressed_name, target_path};
use kompression::{FormatId, decompress};
use std::fs;
use std::path::Path;

pub fn cmd_decompress(
    format: FormatId,
    input: &Path,
    output: Option<&Path>,
    size: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let unpacked = decompress(format, &data, size)?;
    let target = target_path(decompressed_name(input, format), output, false);
    fs::write(&target, &unpacked)?;

    println!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        target.display(),
        data.len(),
        unpacked.len()
    );
    Ok(())
}
