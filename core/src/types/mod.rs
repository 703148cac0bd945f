//! Core type definitions for DDSM conversion
//!
//! This module provides the fundamental types used throughout the library:
//! - [`Scanner`] and [`Institution`]: digitizer identity and the fixed lookup between them
//! - [`Sequence`] and [`SequenceInfo`]: the four standard views and their geometry
//! - [`Point`], [`Contour`], [`BoundingBox`]: annotation geometry
//! - [`PixelGrid`]: row-major raw, calibrated and display images
//! - [`ConvertConfig`]: conversion options

mod config;
mod enums;
mod geometry;
mod grid;
mod sequence;

pub use config::{ConvertConfig, MismatchPolicy, OutputMode};
pub use enums::{Institution, Laterality, Scanner, ViewPosition, SCANNER_INSTITUTIONS};
pub use geometry::{BoundingBox, Contour, Point};
pub use grid::{DensityImage, DisplayImage, PixelGrid, RawImage};
pub use sequence::{Sequence, SequenceInfo, ALL_SEQUENCES};
