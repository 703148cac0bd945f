use crate::error::{DdsmError, Result};
use crate::types::{DensityImage, Institution, RawImage, Scanner};
use std::fmt;

/// Lowest optical density kept after calibration
pub const OD_FLOOR: f64 = 0.05;

/// Highest optical density kept after calibration
pub const OD_CEILING: f64 = 3.0;

/// Clamps an optical density into `[OD_FLOOR, OD_CEILING]`
#[inline]
pub fn clamp_density(od: f64) -> f64 {
    od.clamp(OD_FLOOR, OD_CEILING)
}

/// Scanner-specific mapping from raw sample value to optical density
///
/// Each DDSM digitizer site published its own fit; the variant is chosen
/// from the (institution, scanner) pair and an unlisted pair has no formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calibration {
    /// MGH, DBA scanner: log-linear
    MghDba,
    /// MGH, Howtek scanner: linear
    MghHowtek,
    /// WFU, Lumisys scanner: linear
    WfuLumisys,
    /// ISMD, Howtek scanner: linear
    IsmdHowtek,
}

impl Calibration {
    /// Selects the formula for a scanner combination
    ///
    /// # Errors
    ///
    /// Returns [`DdsmError::UnsupportedCalibration`] for any other pair.
    pub fn for_scanner(institution: Institution, scanner: Scanner) -> Result<Self> {
        match (institution, scanner) {
            (Institution::Mgh, Scanner::Dba) => Ok(Calibration::MghDba),
            (Institution::Mgh, Scanner::Howtek) => Ok(Calibration::MghHowtek),
            (Institution::Wfu, Scanner::Lumisys) => Ok(Calibration::WfuLumisys),
            (Institution::Ismd, Scanner::Howtek) => Ok(Calibration::IsmdHowtek),
            _ => Err(DdsmError::UnsupportedCalibration {
                institution: institution.to_string(),
                scanner: scanner.to_string(),
            }),
        }
    }

    /// Unclamped optical density of a raw sample
    #[inline]
    pub fn optical_density(&self, pixel: f64) -> f64 {
        match self {
            // +1 keeps log10 defined at zero
            Calibration::MghDba => ((pixel + 1.0).log10() - 4.80662) / -1.07553,
            Calibration::MghHowtek => -0.00094568 * pixel + 3.789,
            Calibration::WfuLumisys => (pixel - 4096.99) / -1009.01,
            Calibration::IsmdHowtek => -0.00099055807612 * pixel + 3.96604095240593,
        }
    }

    /// Calibrated, clamped optical density of a raw sample
    #[inline]
    pub fn apply(&self, pixel: u16) -> f64 {
        clamp_density(self.optical_density(f64::from(pixel)))
    }

    /// Calibrates a full image, one parallel task per row
    ///
    /// # Example
    ///
    /// ```
    /// use ddsm_core::calibration::Calibration;
    /// use ddsm_core::{Institution, PixelGrid, Scanner};
    ///
    /// let raw = PixelGrid::from_vec(2, 1, vec![0u16, 4000]).unwrap();
    /// let calibration = Calibration::for_scanner(Institution::Mgh, Scanner::Howtek).unwrap();
    /// let od = calibration.calibrate(&raw);
    /// assert_eq!(od.as_slice()[0], 3.0);
    /// assert_eq!(od.as_slice()[1], 0.05);
    /// ```
    pub fn calibrate(&self, raw: &RawImage) -> DensityImage {
        raw.par_map(|&pixel| self.apply(pixel))
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Calibration::MghDba => "MGH/DBA",
            Calibration::MghHowtek => "MGH/HOWTEK",
            Calibration::WfuLumisys => "WFU/LUMISYS",
            Calibration::IsmdHowtek => "ISMD/HOWTEK",
        };
        write!(f, "{}", name)
    }
}

/// Converts a raw image to clamped optical density for a scanner combination
///
/// # Errors
///
/// Returns [`DdsmError::UnsupportedCalibration`] if no formula exists for the pair.
pub fn optical_density_correction(
    raw: &RawImage,
    institution: Institution,
    scanner: Scanner,
) -> Result<DensityImage> {
    Ok(Calibration::for_scanner(institution, scanner)?.calibrate(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelGrid;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    #[rstest]
    #[case(Institution::Mgh, Scanner::Dba, Calibration::MghDba)]
    #[case(Institution::Mgh, Scanner::Howtek, Calibration::MghHowtek)]
    #[case(Institution::Wfu, Scanner::Lumisys, Calibration::WfuLumisys)]
    #[case(Institution::Ismd, Scanner::Howtek, Calibration::IsmdHowtek)]
    fn test_formula_selection(
        #[case] institution: Institution,
        #[case] scanner: Scanner,
        #[case] expected: Calibration,
    ) {
        assert_eq!(
            Calibration::for_scanner(institution, scanner).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(Institution::Mgh, Scanner::Lumisys)]
    #[case(Institution::Wfu, Scanner::Howtek)]
    #[case(Institution::Ismd, Scanner::Dba)]
    fn test_unsupported_combination(#[case] institution: Institution, #[case] scanner: Scanner) {
        let err = Calibration::for_scanner(institution, scanner).unwrap_err();
        assert!(matches!(err, DdsmError::UnsupportedCalibration { .. }));
    }

    #[test]
    fn test_mgh_howtek_zero_pixel() {
        let od = Calibration::MghHowtek.optical_density(0.0);
        assert!((od - 3.789).abs() < EPS);
        // above the ceiling before clamping
        assert_eq!(Calibration::MghHowtek.apply(0), OD_CEILING);
        // far below the floor
        assert_eq!(Calibration::MghHowtek.apply(u16::MAX), OD_FLOOR);
    }

    #[rstest]
    #[case(Calibration::MghDba, 1000.0, (1001f64.log10() - 4.80662) / -1.07553)]
    #[case(Calibration::MghHowtek, 2000.0, -0.00094568 * 2000.0 + 3.789)]
    #[case(Calibration::WfuLumisys, 2048.0, (2048.0 - 4096.99) / -1009.01)]
    #[case(Calibration::IsmdHowtek, 3000.0, -0.00099055807612 * 3000.0 + 3.96604095240593)]
    fn test_formula_values(
        #[case] calibration: Calibration,
        #[case] pixel: f64,
        #[case] expected: f64,
    ) {
        assert!((calibration.optical_density(pixel) - expected).abs() < EPS);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        for x in [-10.0, 0.0, 0.05, 0.5, 2.999, 3.0, 3.5, 100.0] {
            let once = clamp_density(x);
            assert_eq!(clamp_density(once), once);
            assert!((OD_FLOOR..=OD_CEILING).contains(&once));
        }
    }

    #[test]
    fn test_calibrate_keeps_shape() {
        let raw = PixelGrid::from_vec(3, 2, vec![0u16, 1000, 2000, 3000, 4000, 65535]).unwrap();
        let od = optical_density_correction(&raw, Institution::Wfu, Scanner::Lumisys).unwrap();
        assert_eq!(od.width(), 3);
        assert_eq!(od.height(), 2);
        for (&pixel, &value) in raw.as_slice().iter().zip(od.as_slice()) {
            assert_eq!(value, Calibration::WfuLumisys.apply(pixel));
            assert!((OD_FLOOR..=OD_CEILING).contains(&value));
        }
    }

    #[test]
    fn test_correction_unsupported() {
        let raw = PixelGrid::from_vec(1, 1, vec![0u16]).unwrap();
        assert!(optical_density_correction(&raw, Institution::Wfu, Scanner::Dba).is_err());
    }
}
