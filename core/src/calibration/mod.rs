//! Photometric calibration of decompressed scans
//!
//! Raw digitizer samples are converted to optical density with a
//! scanner-specific formula and clamped; a separate display remap turns
//! density into an 8-bit viewable image.

pub mod display;
pub mod formula;

pub use display::{display_remap, normalize_raw};
pub use formula::{clamp_density, optical_density_correction, Calibration, OD_CEILING, OD_FLOOR};
