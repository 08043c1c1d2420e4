//! Verify command implementation.

use crate::utils::space_savings;
use kompression::{FormatId, compress, decompress};
use std::fs;
use std::path::PathBuf;

fn round_trip(format: FormatId, data: &[u8]) -> Result<usize, String> {
    let packed = compress(format, data).map_err(|e| format!("compress: {e}"))?;
    let unpacked =
        decompress(format, &packed, Some(data.len())).map_err(|e| format!("decompress: {e}"))?;
    if unpacked != data {
        return Err("decompressed data differs".to_string());
    }
    Ok(packed.len())
}

pub fn cmd_verify(format: FormatId, inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying {} file(s) with {}", inputs.len(), format);
    println!("{:>10} {:>10} {:>7}  Name", "Size", "Packed", "Saved");
    println!("{}", "-".repeat(60));

    let mut errors: Vec<(String, String)> = Vec::new();
    for input in inputs {
        let data = fs::read(input)?;
        match round_trip(format, &data) {
            Ok(packed) => println!(
                "{:>10} {:>10} {:>6.1}%  {}",
                data.len(),
                packed,
                space_savings(data.len(), packed),
                input.display()
            ),
            Err(e) => {
                println!("{:>10} {:>10} {:>7}  {}", data.len(), "-", "FAILED", input.display());
                errors.push((input.display().to_string(), e));
            }
        }
    }

    println!("{}", "-".repeat(60));
    if errors.is_empty() {
        println!("All {} file(s) OK", inputs.len());
        return Ok(());
    }

    for (name, e) in &errors {
        eprintln!("  {}: {}", name, e);
    }
    Err(format!("{} of {} file(s) failed", errors.len(), inputs.len()).into())
}
