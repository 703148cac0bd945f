use super::{Laterality, ViewPosition};
use std::fmt;

/// One of the four standard views scanned per DDSM case
///
/// The sidecar file and the image file names use the upper-case key
/// (`LEFT_CC`, `RIGHT_MLO`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Sequence {
    LeftCc,
    RightCc,
    LeftMlo,
    RightMlo,
}

impl Sequence {
    /// Returns the key used in sidecar and image file names
    pub fn key(&self) -> &'static str {
        match self {
            Sequence::LeftCc => "LEFT_CC",
            Sequence::RightCc => "RIGHT_CC",
            Sequence::LeftMlo => "LEFT_MLO",
            Sequence::RightMlo => "RIGHT_MLO",
        }
    }

    /// Parses a sequence key
    pub fn parse(s: &str) -> Option<Self> {
        ALL_SEQUENCES.iter().copied().find(|seq| seq.key() == s)
    }

    /// Returns the breast laterality of this view
    pub fn laterality(&self) -> Laterality {
        match self {
            Sequence::LeftCc | Sequence::LeftMlo => Laterality::Left,
            Sequence::RightCc | Sequence::RightMlo => Laterality::Right,
        }
    }

    /// Returns the view position of this view
    pub fn view(&self) -> ViewPosition {
        match self {
            Sequence::LeftCc | Sequence::RightCc => ViewPosition::Cc,
            Sequence::LeftMlo | Sequence::RightMlo => ViewPosition::Mlo,
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Sequences in the order the sidecar file lists them
pub const ALL_SEQUENCES: [Sequence; 4] = [
    Sequence::LeftCc,
    Sequence::RightCc,
    Sequence::LeftMlo,
    Sequence::RightMlo,
];

/// Per-view image geometry read from the sidecar file
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SequenceInfo {
    /// Image height in pixels
    pub height: usize,
    /// Image width in pixels
    pub width: usize,
    /// Bits per pixel of the scan
    pub bits_per_pixel: u32,
    /// Resolution in microns per pixel
    pub resolution: f64,
}

impl SequenceInfo {
    /// Number of samples in a full image, `None` if it overflows `usize`
    pub fn pixel_count(&self) -> Option<usize> {
        self.height.checked_mul(self.width)
    }
}
