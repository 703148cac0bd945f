//! Utility functions for Python bindings conversions

use pyo3::prelude::*;
use std::path::PathBuf;

use crate::types::{Contour, PixelGrid};

/// Converts a Python path-like object (str or pathlib.Path) to PathBuf
pub fn path_to_pathbuf(path: &Bound<'_, PyAny>) -> PyResult<PathBuf> {
    // Try to convert as string first
    if let Ok(s) = path.extract::<String>() {
        return Ok(PathBuf::from(s));
    }

    // Try to call __str__() for pathlib.Path objects
    if let Ok(s) = path.str() {
        let path_str: String = s.extract()?;
        return Ok(PathBuf::from(path_str));
    }

    Err(pyo3::exceptions::PyTypeError::new_err(
        "Path must be a string or path-like object",
    ))
}

/// Converts a contour to a list of (x, y) tuples
pub fn contour_to_tuples(contour: &Contour) -> Vec<(i32, i32)> {
    contour.points().iter().map(|p| (p.x, p.y)).collect()
}

/// Wraps a flat row-major buffer, checking it against the given shape
pub fn grid_from_list<T>(width: usize, height: usize, data: Vec<T>) -> PyResult<PixelGrid<T>> {
    let len = data.len();
    PixelGrid::from_vec(width, height, data).ok_or_else(|| {
        pyo3::exceptions::PyValueError::new_err(format!(
            "buffer of {} values does not match {}x{}",
            len, width, height
        ))
    })
}
