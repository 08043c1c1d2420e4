//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use kompression::FormatId;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Default name of a compressed file: the format name appended.
pub fn compressed_name(input: &Path, format: FormatId) -> PathBuf {
    with_suffix(input, format.name())
}

/// Default name of a decompressed file: the format extension stripped if
/// present, `.out` appended otherwise.
pub fn decompressed_name(input: &Path, format: FormatId) -> PathBuf {
    match input.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(format.name()) => input.with_extension(""),
        _ => with_suffix(input, "out"),
    }
}

/// Where the result for `input` is written.
///
/// With several inputs `output` is a directory; with one it is the file.
pub fn target_path(default: PathBuf, output: Option<&Path>, several: bool) -> PathBuf {
    match output {
        Some(dir) if several => match default.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(&default),
        },
        Some(file) => file.to_path_buf(),
        None => default,
    }
}

/// Space saved, as a percentage of the original size.
pub fn space_savings(original: usize, packed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - packed as f64 / original as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_name() {
        assert_eq!(
            compressed_name(Path::new("data/overlay.bin"), FormatId::Lz10),
            PathBuf::from("data/overlay.bin.lz10")
        );
    }

    #[test]
    fn test_decompressed_name() {
        assert_eq!(
            decompressed_name(Path::new("overlay.bin.lz10"), FormatId::Lz10),
            PathBuf::from("overlay.bin")
        );
        assert_eq!(
            decompressed_name(Path::new("course.SZS"), FormatId::Yaz0Be),
            PathBuf::from("course.SZS.out")
        );
        assert_eq!(
            decompressed_name(Path::new("movie.CRILAYLA"), FormatId::Crilayla),
            PathBuf::from("movie")
        );
    }

    #[test]
    fn test_target_path() {
        let default = PathBuf::from("in/a.bin.lz10");
        assert_eq!(target_path(default.clone(), None, true), default);
        assert_eq!(
            target_path(default.clone(), Some(Path::new("out")), true),
            PathBuf::from("out/a.bin.lz10")
        );
        assert_eq!(
            target_path(default, Some(Path::new("packed.bin")), false),
            PathBuf::from("packed.bin")
        );
    }

    #[test]
    fn test_space_savings() {
        assert_eq!(space_savings(0, 10), 0.0);
        assert_eq!(space_savings(200, 50), 75.0);
        assert!(space_savings(10, 20) < 0.0);
    }
}
