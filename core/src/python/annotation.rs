//! Python wrapper for AnnotationRow and the module-level functions

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::enums::{PyInstitution, PyOutputMode, PyScanner};
use super::errors::convert_error;
use super::metadata::PyCaseMetadata;
use super::overlay::PyOverlayRecord;
use super::utils::{grid_from_list, path_to_pathbuf};
use crate::annotation::{AnnotationRow, AnnotationTable, COLUMNS};

/// One bounding-box table row
#[pyclass(name = "AnnotationRow", module = "ddsm")]
#[derive(Clone)]
pub struct PyAnnotationRow {
    pub(crate) inner: AnnotationRow,
}

#[pymethods]
impl PyAnnotationRow {
    #[getter]
    fn name(&self) -> &str {
        &self.inner.name
    }

    #[getter]
    fn feature(&self) -> &str {
        &self.inner.feature
    }

    #[getter]
    fn severity(&self) -> Option<String> {
        self.inner.severity.clone()
    }

    #[getter]
    fn x1(&self) -> i32 {
        self.inner.bbox.x1()
    }

    #[getter]
    fn y1(&self) -> i32 {
        self.inner.bbox.y1()
    }

    #[getter]
    fn x2(&self) -> i32 {
        self.inner.bbox.x2()
    }

    #[getter]
    fn y2(&self) -> i32 {
        self.inner.bbox.y2()
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.height
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.width
    }

    /// Convert to a dictionary keyed by the CSV column names
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        dict.set_item("NAME", &self.inner.name)?;
        dict.set_item("FEATURE", &self.inner.feature)?;
        dict.set_item("SEVERITY", self.inner.severity.clone())?;
        dict.set_item("X1", self.inner.bbox.x1())?;
        dict.set_item("Y1", self.inner.bbox.y1())?;
        dict.set_item("X2", self.inner.bbox.x2())?;
        dict.set_item("Y2", self.inner.bbox.y2())?;
        dict.set_item("HEIGHT", self.inner.height)?;
        dict.set_item("WIDTH", self.inner.width)?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!("AnnotationRow({})", self.inner.fields().join(", "))
    }
}

/// Project every retained abnormality of an overlay to a bounding-box row
///
/// Abnormalities with an empty boundary are skipped.
///
/// Args:
///     record: Parsed overlay
///     image_name: Image file name for the NAME column
///     height: Image height from the sidecar
///     width: Image width from the sidecar
#[pyfunction]
#[pyo3(name = "project_annotations")]
pub fn py_project_annotations(
    record: &PyOverlayRecord,
    image_name: &str,
    height: usize,
    width: usize,
) -> Vec<PyAnnotationRow> {
    crate::annotation::project_annotations(&record.inner, image_name, height, width)
        .rows
        .into_iter()
        .map(|inner| PyAnnotationRow { inner })
        .collect()
}

/// Write rows as CSV with the standard header
#[pyfunction]
#[pyo3(name = "write_csv")]
pub fn py_write_csv(rows: Vec<PyAnnotationRow>, path: &Bound<'_, PyAny>) -> PyResult<()> {
    let path_buf = path_to_pathbuf(path)?;
    let mut table = AnnotationTable::with_capacity(rows.len());
    table.append(rows.into_iter().map(|r| r.inner));
    table
        .save_csv(path_buf)
        .map_err(|e| convert_error(e.into()))
}

/// Column names of the annotation table
#[pyfunction]
#[pyo3(name = "columns")]
pub fn py_columns() -> Vec<&'static str> {
    COLUMNS.to_vec()
}

/// Look up the scan institution for a file prefix letter and digitizer code
///
/// Raises:
///     MetadataError: If the pair is not in the fixed table
#[pyfunction]
#[pyo3(name = "lookup_institution")]
pub fn py_lookup_institution(letter: char, scanner: &str) -> PyResult<PyInstitution> {
    crate::parsing::lookup_institution(letter, scanner)
        .map(Into::into)
        .map_err(convert_error)
}

/// Calibrate raw samples to clamped optical density
///
/// Args:
///     samples: Row-major 16-bit samples
///     width, height: Image shape
///     institution, scanner: Digitizer combination selecting the formula
///
/// Raises:
///     CalibrationError: If no formula exists for the combination
#[pyfunction]
#[pyo3(name = "optical_density_correction")]
pub fn py_optical_density_correction(
    samples: Vec<u16>,
    width: usize,
    height: usize,
    institution: &PyInstitution,
    scanner: &PyScanner,
) -> PyResult<Vec<f64>> {
    let raw = grid_from_list(width, height, samples)?;
    crate::calibration::optical_density_correction(&raw, institution.inner, scanner.inner)
        .map(|od| od.into_vec())
        .map_err(convert_error)
}

/// Convert raw samples to an 8-bit display buffer for a case
#[pyfunction]
#[pyo3(name = "render_image")]
pub fn py_render_image(
    samples: Vec<u16>,
    width: usize,
    height: usize,
    metadata: &PyCaseMetadata,
    mode: &PyOutputMode,
) -> PyResult<Vec<u8>> {
    let raw = grid_from_list(width, height, samples)?;
    crate::api::render_image(&raw, &metadata.inner, mode.inner)
        .map(|display| display.into_vec())
        .map_err(convert_error)
}
