use clap::Parser;
use ddsm_core::api::{save_display_image, ImageCase};
use ddsm_core::cli::{ModeArgs, DEFAULT_JPEG_BIN};
use ddsm_core::decode::LjpegDecompressor;
use ddsm_core::parsing::parse_ics_file;
use ddsm_core::{ConvertConfig, ImageConverter};
use log::{error, info};
use std::path::PathBuf;
use std::process;

/// CLI tool for converting a single DDSM scan
#[derive(Parser, Debug)]
#[command(name = "ljpeg")]
#[command(about = "Convert one DDSM LJPEG scan to an 8-bit image")]
#[command(version)]
struct Cli {
    /// LJPEG file named <case>.<SEQUENCE>.LJPEG
    #[arg(value_name = "LJPEG")]
    input: PathBuf,

    /// Output image; the format follows the extension
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Case sidecar (defaults to the .ics next to the scan)
    #[arg(long, value_name = "FILE")]
    ics: Option<PathBuf>,

    #[command(flatten)]
    mode: ModeArgs,

    /// Path to the LJPEG decoder binary
    #[arg(long, value_name = "FILE", default_value = DEFAULT_JPEG_BIN)]
    jpeg_bin: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let case = match ImageCase::from_path(&cli.input) {
        Ok(case) => case,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let ics_path = cli.ics.clone().unwrap_or_else(|| case.ics_path());
    let metadata = match parse_ics_file(&ics_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("Failed to read {}: {}", ics_path.display(), e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let config = ConvertConfig::default().with_mode(cli.mode.output_mode());
    let converter = ImageConverter::new(LjpegDecompressor::new(&cli.jpeg_bin), config);
    let result = converter
        .render(&case, &metadata)
        .and_then(|display| save_display_image(&display, &cli.output));

    match result {
        Ok(()) => info!("Wrote {}", cli.output.display()),
        Err(e) => {
            error!("Cannot convert {}: {}", cli.input.display(), e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddsm_core::OutputMode;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "ljpeg",
            "A_0001_1.LEFT_CC.LJPEG",
            "out.png",
            "--ics",
            "A-0001-1.ics",
            "--normalize",
        ])
        .unwrap();
        assert_eq!(cli.mode.output_mode(), OutputMode::Normalize);
        assert_eq!(cli.ics, Some(PathBuf::from("A-0001-1.ics")));
    }

    #[test]
    fn test_mode_required() {
        assert!(Cli::try_parse_from(["ljpeg", "a.LEFT_CC.LJPEG", "out.png"]).is_err());
    }
}
