use thiserror::Error;

/// Result type for DDSM conversion operations
pub type Result<T> = std::result::Result<T, DdsmError>;

/// Error types for DDSM conversion operations
#[derive(Error, Debug)]
pub enum DdsmError {
    /// Sidecar (ICS) file is missing a required field or carries an unparsable value
    #[error("Malformed metadata in {file}: {detail}")]
    MalformedMetadata { file: String, detail: String },

    /// The (file prefix letter, scanner type) pair has no scan institution
    #[error("Unknown scanner mapping: letter '{letter}' with scanner '{scanner}'")]
    UnknownScannerMapping { letter: char, scanner: String },

    /// Chain code direction outside 0-7
    #[error("Invalid chain code {code} at position {position}")]
    InvalidChainCode { position: usize, code: i64 },

    /// Overlay content that cannot be tokenized into the expected shape
    #[error("Malformed overlay {name}: {detail}")]
    MalformedOverlay { name: String, detail: String },

    /// Abnormality without usable boundary geometry
    #[error("Degenerate annotation in {name}, abnormality {abnormality}: {reason}")]
    DegenerateAnnotation {
        name: String,
        abnormality: usize,
        reason: String,
    },

    /// Declared and retained abnormality counts differ
    #[error("Abnormality count mismatch in {name}: {declared} declared, {retained} retained")]
    AbnormalityCountMismatch {
        name: String,
        declared: usize,
        retained: usize,
    },

    /// No calibration formula for the scanner combination
    #[error("Unsupported calibration for institution {institution} with scanner {scanner}")]
    UnsupportedCalibration {
        institution: String,
        scanner: String,
    },

    /// Sidecar does not describe the requested sequence
    #[error("Sequence {sequence} not found in {file}")]
    MissingSequence { file: String, sequence: String },

    /// External decompressor failure
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Decompressed image is not single-channel
    #[error("Unsupported channel count: {0} (expected 1)")]
    UnsupportedChannels(u32),

    /// Decompressed sample count does not fit the sidecar geometry
    #[error("Dimension mismatch: expected {expected} samples, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Image file name does not follow `<case>.<SEQUENCE>.LJPEG`
    #[error("Invalid image name: {0}")]
    InvalidImageName(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

impl DdsmError {
    /// Returns whether this error only affects a single abnormality,
    /// leaving the rest of the case usable
    pub fn is_abnormality_local(&self) -> bool {
        matches!(
            self,
            DdsmError::InvalidChainCode { .. }
                | DdsmError::MalformedOverlay { .. }
                | DdsmError::DegenerateAnnotation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = DdsmError::UnknownScannerMapping {
            letter: 'Z',
            scanner: "DBA".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown scanner mapping: letter 'Z' with scanner 'DBA'"
        );

        let err = DdsmError::AbnormalityCountMismatch {
            name: "A_1234_1.LEFT_CC".to_string(),
            declared: 3,
            retained: 2,
        };
        assert!(err.to_string().contains("A_1234_1.LEFT_CC"));
        assert!(err.to_string().contains("3 declared, 2 retained"));
    }

    #[test]
    fn test_abnormality_local_errors() {
        assert!(DdsmError::InvalidChainCode {
            position: 4,
            code: 9
        }
        .is_abnormality_local());
        assert!(!DdsmError::UnsupportedChannels(3).is_abnormality_local());
    }
}
