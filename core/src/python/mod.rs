//! Python bindings for ddsm
//!
//! This module provides PyO3 bindings for reading DDSM sidecar and overlay
//! files, projecting annotations to bounding boxes and calibrating scans.

// Suppress false positive warnings from PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod annotation;
mod enums;
mod errors;
#[macro_use]
mod macros;
mod metadata;
mod overlay;
mod utils;

pub use annotation::*;
pub use enums::*;
pub use errors::*;
pub use metadata::*;
pub use overlay::*;

/// Python module definition
#[pymodule]
fn _ddsm(py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register exception classes
    m.add("DdsmError", py.get_type_bound::<errors::PyDdsmError>())?;
    m.add(
        "MetadataError",
        py.get_type_bound::<errors::PyMetadataError>(),
    )?;
    m.add("OverlayError", py.get_type_bound::<errors::PyOverlayError>())?;
    m.add(
        "CalibrationError",
        py.get_type_bound::<errors::PyCalibrationError>(),
    )?;
    m.add("ImageError", py.get_type_bound::<errors::PyImageError>())?;

    // Register enum classes
    m.add_class::<PyScanner>()?;
    m.add_class::<PyInstitution>()?;
    m.add_class::<PySequence>()?;
    m.add_class::<PyOutputMode>()?;

    // Register data structure classes
    m.add_class::<PySequenceInfo>()?;
    m.add_class::<PyCaseMetadata>()?;
    m.add_class::<PyAbnormality>()?;
    m.add_class::<PyOverlayRecord>()?;
    m.add_class::<PyAnnotationRow>()?;

    // Register functions
    m.add_function(wrap_pyfunction!(py_project_annotations, m)?)?;
    m.add_function(wrap_pyfunction!(py_write_csv, m)?)?;
    m.add_function(wrap_pyfunction!(py_columns, m)?)?;
    m.add_function(wrap_pyfunction!(py_lookup_institution, m)?)?;
    m.add_function(wrap_pyfunction!(py_optical_density_correction, m)?)?;
    m.add_function(wrap_pyfunction!(py_render_image, m)?)?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
