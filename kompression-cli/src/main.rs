//! Kompression CLI - game compression formats from the command line.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{cmd_compress, cmd_decompress, cmd_formats, cmd_verify};
use kompression::{FormatId, MatchStrategy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kompression")]
#[command(author, version, about = "Compress and decompress game asset formats")]
#[command(long_about = "
Kompression packs and unpacks the LZ-family formats used by game engines:
Nintendo LZ10/LZ11, Yaz0, MIO0, ring LZSS variants, Deflate, CRILAYLA and more.
Run `kompression formats` for the full list.

Examples:
  kompression compress -f lz10 overlay.bin
  kompression compress -f yaz0-be -o packed/ a.szs b.szs c.szs
  kompression decompress -f lz10 overlay.bin.lz10 --size 40960
  kompression verify -f crilayla movie.usm
  kompression formats --json
")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files into a format
    #[command(alias = "c")]
    Compress {
        /// Target format (see `formats`)
        #[arg(short, long)]
        format: FormatId,

        /// Files to compress
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or directory when compressing several files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Match finder (auto, naive, suffix-tree, suffix-array)
        #[arg(short, long, default_value = "auto")]
        strategy: MatchStrategy,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Decompress one file
    #[command(alias = "d")]
    Decompress {
        /// Source format (see `formats`)
        #[arg(short, long)]
        format: FormatId,

        /// File to decompress
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Expected decompressed size; a different result is an error
        #[arg(long)]
        size: Option<usize>,
    },

    /// Round-trip files through a format and report ratios
    #[command(alias = "t")]
    Verify {
        /// Format to check (see `formats`)
        #[arg(short, long)]
        format: FormatId,

        /// Files to check
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List supported formats
    Formats {
        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compress {
            format,
            inputs,
            output,
            strategy,
            no_progress,
        } => cmd_compress(format, &inputs, output.as_deref(), strategy, !no_progress),
        Commands::Decompress {
            format,
            input,
            output,
            size,
        } => cmd_decompress(format, &input, output.as_deref(), size),
        Commands::Verify { format, inputs } => cmd_verify(format, &inputs),
        Commands::Formats { json } => cmd_formats(json),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::parse_from([
            "kompression",
            "-vv",
            "compress",
            "-f",
            "Yaz0_BE",
            "--strategy",
            "suffix-tree",
            "a.bin",
            "b.bin",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compress {
                format,
                inputs,
                strategy,
                ..
            } => {
                assert_eq!(format, FormatId::Yaz0Be);
                assert_eq!(inputs.len(), 2);
                assert_eq!(strategy, MatchStrategy::SuffixTree);
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["kompression", "verify", "-f", "lzma", "x"]).is_err());
    }
}
