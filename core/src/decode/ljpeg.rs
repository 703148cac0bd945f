use crate::error::{DdsmError, Result};
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::process::Command;
use std::sync::OnceLock;

use super::{DecodedImage, Decompressor};

/// Component line printed by the LJPEG tool in `-d -s` mode
///
/// Sample output:
/// ```text
/// GW:1979  GH:4349  R:0
/// C:1  N:xx.ljpeg.1  W:1979  H:4349  hf:1  vf:1
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub channels: u32,
    pub output_file: String,
    pub width: usize,
    pub height: usize,
}

impl ComponentInfo {
    /// Parses the tool's report
    ///
    /// # Errors
    ///
    /// Returns [`DdsmError::Decompression`] if no component line is found.
    pub fn parse(output: &str) -> Result<Self> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"\sC:(\d+)\s+N:(\S+)\s+W:(\d+)\s+H:(\d+)\s")
                .expect("Failed to compile regex")
        });

        // the pattern needs whitespace on both sides of the component line
        let padded = format!(" {} ", output);
        let caps = re.captures(&padded).ok_or_else(|| {
            DdsmError::Decompression(format!("unrecognized decoder output: '{}'", output.trim()))
        })?;

        Ok(ComponentInfo {
            channels: number(&caps, 1)?,
            output_file: caps[2].to_string(),
            width: number(&caps, 3)?,
            height: number(&caps, 4)?,
        })
    }
}

fn number<T>(caps: &Captures<'_>, i: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    caps[i].parse().map_err(|e| {
        DdsmError::Decompression(format!("bad decoder field '{}': {}", &caps[i], e))
    })
}

/// Decompressor backed by the external LJPEG `jpeg` tool
///
/// The tool writes the decoded samples to a side file whose name it
/// reports on stdout; the file is read and removed afterwards.
#[derive(Debug, Clone)]
pub struct LjpegDecompressor {
    binary: PathBuf,
}

impl LjpegDecompressor {
    /// Creates a decompressor running the given tool binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the tool binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-d")
            .arg("-s")
            .arg(path)
            .output()
            .map_err(|e| {
                DdsmError::Decompression(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;
        if !output.status.success() {
            return Err(DdsmError::Decompression(format!(
                "{} exited with {} on {}",
                self.binary.display(),
                output.status,
                path.display()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Decompressor for LjpegDecompressor {
    fn decompress(&self, path: &Path) -> Result<DecodedImage> {
        let report = self.run(path)?;
        let info = ComponentInfo::parse(&report)?;
        debug!(
            "{}: C:{} N:{} W:{} H:{}",
            path.display(),
            info.channels,
            info.output_file,
            info.width,
            info.height
        );

        let side_file = locate_output(&info.output_file, path);
        let samples = read_samples(&side_file);
        // remove the side file whether or not it could be read
        remove_side_file(&side_file);

        Ok(DecodedImage {
            width: info.width,
            height: info.height,
            channels: info.channels,
            samples: samples?,
        })
    }
}

/// Resolves the reported side file, falling back to the input's directory
fn locate_output(reported: &str, input: &Path) -> PathBuf {
    let direct = PathBuf::from(reported);
    if direct.is_absolute() || direct.exists() {
        return direct;
    }
    input
        .parent()
        .map(|dir| dir.join(direct.file_name().unwrap_or_default()))
        .filter(|p| p.exists())
        .unwrap_or(direct)
}

fn remove_side_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Could not remove decoder output {}: {}", path.display(), e);
    }
}

/// Reads a file of little-endian 16-bit samples
pub fn read_samples(path: &Path) -> Result<Vec<u16>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 2 != 0 {
        return Err(DdsmError::Decompression(format!(
            "{} has an odd byte count {}",
            path.display(),
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect())
}
