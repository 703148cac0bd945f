//! Access to decompressed LJPEG scans
//!
//! Decompression itself is delegated to a [`Decompressor`]; this module only
//! validates its output against the sidecar geometry and fixes the sample
//! byte order.

pub mod ljpeg;

use crate::error::{DdsmError, Result};
use crate::types::{RawImage, SequenceInfo};
use log::warn;
use std::path::Path;

pub use ljpeg::LjpegDecompressor;

/// Sample buffer as produced by a decompressor
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub channels: u32,
    /// Row-major 16-bit samples in the decompressor's native byte order
    pub samples: Vec<u16>,
}

/// Decodes a compressed scan into raw samples
pub trait Decompressor {
    /// Decompresses the image at `path`
    fn decompress(&self, path: &Path) -> Result<DecodedImage>;
}

impl<D: Decompressor + ?Sized> Decompressor for &D {
    fn decompress(&self, path: &Path) -> Result<DecodedImage> {
        (**self).decompress(path)
    }
}

/// Swaps the high and low bytes of every sample
pub fn swap_sample_bytes(samples: &mut [u16]) {
    for sample in samples.iter_mut() {
        *sample = sample.swap_bytes();
    }
}

/// Turns decompressor output into a raw image with sidecar geometry
///
/// Rejects multi-channel output and fixes the byte order. When the decoded
/// width disagrees with the sidecar but the sample count matches, the
/// buffer is re-read with the sidecar geometry.
///
/// # Errors
///
/// - [`DdsmError::UnsupportedChannels`] if the image is not single-channel
/// - [`DdsmError::DimensionMismatch`] if the sample count fits neither geometry
pub fn prepare_raw(decoded: DecodedImage, info: &SequenceInfo) -> Result<RawImage> {
    if decoded.channels != 1 {
        return Err(DdsmError::UnsupportedChannels(decoded.channels));
    }
    let DecodedImage {
        mut width,
        mut height,
        mut samples,
        ..
    } = decoded;

    swap_sample_bytes(&mut samples);

    if width != info.width {
        warn!(
            "reshape: decoded {}x{} to sidecar {}x{}",
            height, width, info.height, info.width
        );
        width = info.width;
        height = info.height;
    }

    let actual = samples.len();
    RawImage::from_vec(width, height, samples).ok_or(DdsmError::DimensionMismatch {
        expected: width.saturating_mul(height),
        actual,
    })
}
