use crate::types::{DensityImage, DisplayImage, PixelGrid, RawImage};

/// Optical density mapped to full white
pub const DISPLAY_OD_MIN: f64 = 0.0;

/// Optical density mapped to full black
pub const DISPLAY_OD_MAX: f64 = 4.0;

/// Linearly maps density in `[0, 4]` to intensity in `[255, 0]`
///
/// Values outside the density range saturate at the ends.
#[inline]
pub fn density_to_intensity(od: f64) -> f64 {
    let t = ((od - DISPLAY_OD_MIN) / (DISPLAY_OD_MAX - DISPLAY_OD_MIN)).clamp(0.0, 1.0);
    255.0 * (1.0 - t)
}

/// Renders a calibrated density image for viewing
///
/// Density is inverted into display intensity, then stretched so the
/// darkest pixel becomes 0 and the brightest 255. The input is left
/// untouched so calibrated values remain available for analysis.
pub fn display_remap(od: &DensityImage) -> DisplayImage {
    let intensity = od.par_map(|&v| density_to_intensity(v));
    stretch(&intensity, |v| v as u8)
}

/// Stretches raw samples to the full 8-bit range
///
/// Discards calibration; used when only a viewable image is needed.
pub fn normalize_raw(raw: &RawImage) -> DisplayImage {
    let values = raw.map(|&v| f64::from(v));
    stretch(&values, |v| v.round() as u8)
}

/// Min/max stretch to `[0, 255]`; a constant image maps to all zeros
fn stretch<F>(values: &PixelGrid<f64>, to_u8: F) -> DisplayImage
where
    F: Fn(f64) -> u8 + Sync,
{
    let (lo, hi) = values.min_max().unwrap_or((0.0, 0.0));
    let range = hi - lo;
    values.par_map(|&v| {
        if range > 0.0 {
            to_u8(((v - lo) / range * 255.0).clamp(0.0, 255.0))
        } else {
            0
        }
    })
}
