/// How decompressed pixels are turned into the output image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum OutputMode {
    /// Optical density calibration followed by the display remap
    #[default]
    Correction,
    /// Raw min/max stretch to 8 bit (loses calibration)
    Normalize,
}

/// What to do when an overlay retains fewer abnormalities than it declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum MismatchPolicy {
    /// Keep the retained abnormalities and record a warning
    #[default]
    BestEffort,
    /// Reject the whole overlay
    Strict,
}

/// Configuration for converting DDSM images and annotations
///
/// # Example
///
/// ```
/// use ddsm_core::{ConvertConfig, MismatchPolicy, OutputMode};
///
/// let config = ConvertConfig::default()
///     .with_mode(OutputMode::Normalize)
///     .with_format("tif")
///     .with_mismatch_policy(MismatchPolicy::Strict);
///
/// assert_eq!(config.mode, OutputMode::Normalize);
/// assert_eq!(config.image_extension(), ".tif");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertConfig {
    /// Pixel conversion mode
    pub mode: OutputMode,

    /// Output image format, given as a file extension without the dot
    pub format: String,

    /// Count mismatch handling for overlay files
    pub mismatch_policy: MismatchPolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Correction,
            format: "png".to_string(),
            mismatch_policy: MismatchPolicy::BestEffort,
        }
    }
}

impl ConvertConfig {
    /// Builder: set the pixel conversion mode
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the output image format
    ///
    /// A leading dot is accepted and stripped.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        let format = format.into();
        self.format = format.trim_start_matches('.').to_string();
        self
    }

    /// Builder: set the count mismatch policy
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    /// Output extension including the leading dot
    pub fn image_extension(&self) -> String {
        format!(".{}", self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.mode, OutputMode::Correction);
        assert_eq!(config.format, "png");
        assert_eq!(config.mismatch_policy, MismatchPolicy::BestEffort);
    }

    #[test]
    fn test_format_strips_dot() {
        let config = ConvertConfig::default().with_format(".jpg");
        assert_eq!(config.format, "jpg");
        assert_eq!(config.image_extension(), ".jpg");
    }
}
