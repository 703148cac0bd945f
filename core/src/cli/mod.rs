pub mod report;

use crate::types::{ConvertConfig, MismatchPolicy, OutputMode};
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// Default name of the external LJPEG decoder binary
pub const DEFAULT_JPEG_BIN: &str = "jpeg";

/// Name of the log file written into the output directory
pub const LOG_FILE_NAME: &str = "convert.log";

/// Command-line arguments for ddsmconv
#[derive(Parser, Debug)]
#[command(name = "ddsmconv")]
#[command(about = "Convert DDSM LJPEG scans to images and overlay annotations to CSV tables")]
#[command(version)]
pub struct Cli {
    /// Input folder containing the DDSM case tree
    #[arg(long, value_name = "DIR")]
    pub input: PathBuf,

    /// Output folder for images, tables and the log
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Output image format
    #[arg(long, default_value = "png")]
    pub format: String,

    #[command(flatten)]
    pub mode: ModeArgs,

    /// Reject overlays whose retained abnormality count differs from the declared one
    #[arg(long)]
    pub strict: bool,

    /// Path to the LJPEG decoder binary
    #[arg(long, value_name = "FILE", default_value = DEFAULT_JPEG_BIN)]
    pub jpeg_bin: PathBuf,

    /// Log file (defaults to <output>/convert.log)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Summary format printed after conversion
    #[arg(short, long, default_value = "text")]
    pub summary: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion settings selected on the command line
    pub fn config(&self) -> ConvertConfig {
        let policy = if self.strict {
            MismatchPolicy::Strict
        } else {
            MismatchPolicy::BestEffort
        };
        ConvertConfig::default()
            .with_mode(self.mode.output_mode())
            .with_format(self.format.as_str())
            .with_mismatch_policy(policy)
    }

    /// Log destination, inside the output folder unless given
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.output.join(LOG_FILE_NAME))
    }
}

/// Pixel conversion mode flags; exactly one is required
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct ModeArgs {
    /// Apply optical density correction and the display remap
    #[arg(long)]
    pub correction: bool,

    /// Stretch raw values to 8 bit without calibration
    #[arg(long)]
    pub normalize: bool,
}

impl ModeArgs {
    pub fn output_mode(&self) -> OutputMode {
        if self.normalize {
            OutputMode::Normalize
        } else {
            OutputMode::Correction
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
