//! Python exception types for ddsm
//!
//! This module defines Python exception classes that map to Rust error types.

// Suppress warnings from PyO3's create_exception! macro about gil-refs feature
#![allow(unexpected_cfgs)]

use crate::error::DdsmError;
use pyo3::{create_exception, exceptions::PyException, exceptions::PyIOError, prelude::*};

// Base exception
create_exception!(
    ddsm,
    PyDdsmError,
    PyException,
    "Base exception for all ddsm errors"
);

// Specific exceptions
create_exception!(
    ddsm,
    PyMetadataError,
    PyDdsmError,
    "Sidecar metadata is malformed or does not describe the requested view"
);

create_exception!(
    ddsm,
    PyOverlayError,
    PyDdsmError,
    "Overlay annotation file cannot be used"
);

create_exception!(
    ddsm,
    PyCalibrationError,
    PyDdsmError,
    "No calibration formula for the scanner combination"
);

create_exception!(
    ddsm,
    PyImageError,
    PyDdsmError,
    "Scan decoding or image writing failed"
);

/// Convert Rust DdsmError to appropriate Python exception
pub fn convert_error(err: DdsmError) -> PyErr {
    let msg = err.to_string();
    match err {
        DdsmError::MalformedMetadata { .. }
        | DdsmError::UnknownScannerMapping { .. }
        | DdsmError::MissingSequence { .. }
        | DdsmError::InvalidImageName(_) => PyMetadataError::new_err(msg),
        DdsmError::InvalidChainCode { .. }
        | DdsmError::MalformedOverlay { .. }
        | DdsmError::DegenerateAnnotation { .. }
        | DdsmError::AbnormalityCountMismatch { .. } => PyOverlayError::new_err(msg),
        DdsmError::UnsupportedCalibration { .. } => PyCalibrationError::new_err(msg),
        DdsmError::Decompression(_)
        | DdsmError::UnsupportedChannels(_)
        | DdsmError::DimensionMismatch { .. }
        | DdsmError::ImageError(_) => PyImageError::new_err(msg),
        DdsmError::IoError(_) => PyIOError::new_err(msg),
    }
}
