//! Compress command implementation.

use crate::utils::{compressed_name, create_progress_bar, space_savings, target_path};
use kompression::{CompressOptions, FormatId, MatchStrategy, compress_with};
use std::fs;
use std::path::{Path, PathBuf};

pub fn cmd_compress(
    format: FormatId,
    inputs: &[PathBuf],
    output: Option<&Path>,
    strategy: MatchStrategy,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let several = inputs.len() > 1;
    if let Some(dir) = output.filter(|_| several) {
        fs::create_dir_all(dir)?;
    }

    let options = CompressOptions::new().with_strategy(strategy);
    let pb = create_progress_bar(inputs.len() as u64, progress && several);

    for input in inputs {
        pb.set_message(input.display().to_string());
        let data = fs::read(input)?;
        let packed = compress_with(format, &data, &options)?;
        let target = target_path(compressed_name(input, format), output, several);
        fs::write(&target, &packed)?;

        pb.println(format!(
            "{} -> {} ({} -> {} bytes, {:.1}% saved)",
            input.display(),
            target.display(),
            data.len(),
            packed.len(),
            space_savings(data.len(), packed.len())
        ));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(())
}
