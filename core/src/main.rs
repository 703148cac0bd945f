use clap::Parser;
use ddsm_core::cli::report::TextReport;
use ddsm_core::cli::{Cli, OutputFormat};
use ddsm_core::decode::LjpegDecompressor;
use ddsm_core::{BatchReport, ImageConverter};
use log::{error, info};
use std::fs::{self, File};
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();

    if !cli.input.is_dir() {
        eprintln!("Error: {} is not a directory", cli.input.display());
        process::exit(1);
    }
    if let Err(e) = fs::create_dir_all(&cli.output) {
        eprintln!("Error: cannot create {}: {}", cli.output.display(), e);
        process::exit(1);
    }

    let log_path = cli.log_path();
    if let Err(e) = setup_logging(cli.verbose, &log_path) {
        eprintln!("Error: cannot open log file {}: {}", log_path.display(), e);
        process::exit(1);
    }

    let config = cli.config();
    info!("Processing directory: {}", cli.input.display());
    info!("Using {:?} mode, writing .{} images", config.mode, config.format);

    let converter = ImageConverter::new(LjpegDecompressor::new(&cli.jpeg_bin), config);
    let report = match converter.convert_dir(&cli.input, &cli.output) {
        Ok(report) => report,
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if report.images_found == 0 {
        eprintln!("Error: No LJPEG files found in {}", cli.input.display());
        process::exit(1);
    }

    match report.tables.save_all(&cli.output) {
        Ok(written) => {
            for path in written {
                info!("Wrote {}", path.display());
            }
        }
        Err(e) => {
            error!("Failed to write tables: {}", e);
            eprintln!("Error: Failed to write tables: {}", e);
            process::exit(1);
        }
    }

    output_summary(&report, cli.summary);
}

/// Logs to a file; `--verbose` lowers the level to debug
fn setup_logging(verbose: bool, log_path: &Path) -> std::io::Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let file = File::create(log_path)?;
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn output_summary(report: &BatchReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(report));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(report: &BatchReport) -> Result<String, serde_json::Error> {
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct SummaryJson<'a> {
        images_found: usize,
        images_written: usize,
        image_failures: usize,
        warnings: usize,
        annotation_rows: usize,
        tables: BTreeMap<&'a str, usize>,
        case_failures: BTreeMap<&'a str, &'a str>,
    }

    let output = SummaryJson {
        images_found: report.images_found,
        images_written: report.images_written,
        image_failures: report.image_failures,
        warnings: report.warnings,
        annotation_rows: report.tables.total_rows(),
        tables: report
            .tables
            .iter()
            .map(|(category, table)| (category, table.len()))
            .collect(),
        case_failures: report
            .case_failures
            .iter()
            .map(|(image, reason)| (image.as_str(), reason.as_str()))
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}
