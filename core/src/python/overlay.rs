//! Python wrappers for overlay records and abnormalities

use pyo3::prelude::*;

use super::errors::convert_error;
use super::utils::{contour_to_tuples, path_to_pathbuf};
use crate::parsing::{Abnormality, OverlayRecord};
use crate::types::MismatchPolicy;

/// One annotated abnormality
#[pyclass(name = "Abnormality", module = "ddsm")]
#[derive(Clone)]
pub struct PyAbnormality {
    pub(crate) inner: Abnormality,
}

#[pymethods]
impl PyAbnormality {
    /// 1-based position in the overlay
    #[getter]
    fn index(&self) -> usize {
        self.inner.index
    }

    #[getter]
    fn lesion_types(&self) -> Vec<String> {
        self.inner.lesion_types.clone()
    }

    /// Descriptor key/value pairs such as ("SHAPE", "ROUND")
    #[getter]
    fn descriptors(&self) -> Vec<(String, String)> {
        self.inner.descriptors.clone()
    }

    #[getter]
    fn pathologies(&self) -> Vec<String> {
        self.inner.pathologies.clone()
    }

    /// BI-RADS assessment
    #[getter]
    fn assessment(&self) -> Option<u8> {
        self.inner.assessment
    }

    #[getter]
    fn subtlety(&self) -> Option<u8> {
        self.inner.subtlety
    }

    #[getter]
    fn total_outlines(&self) -> usize {
        self.inner.total_outlines
    }

    /// Lesion types joined with "_"
    #[getter]
    fn feature(&self) -> String {
        self.inner.feature()
    }

    /// First reported pathology
    #[getter]
    fn pathology(&self) -> Option<String> {
        self.inner.pathology().map(str::to_string)
    }

    /// Boundary outline as a list of (x, y)
    #[getter]
    fn boundary(&self) -> Vec<(i32, i32)> {
        contour_to_tuples(&self.inner.boundary)
    }

    /// Core outlines as lists of (x, y)
    #[getter]
    fn cores(&self) -> Vec<Vec<(i32, i32)>> {
        self.inner.cores.iter().map(contour_to_tuples).collect()
    }

    /// Boundary bounding box as (x1, y1, x2, y2), or None for an empty boundary
    fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        self.inner
            .boundary
            .bounding_box()
            .map(|b| (b.x1(), b.y1(), b.x2(), b.y2()))
    }

    fn __repr__(&self) -> String {
        format!(
            "Abnormality(index={}, feature='{}', pathology={:?})",
            self.inner.index,
            self.inner.feature(),
            self.inner.pathology()
        )
    }
}

/// Parsed overlay file
#[pyclass(name = "OverlayRecord", module = "ddsm")]
pub struct PyOverlayRecord {
    pub(crate) inner: OverlayRecord,
}

#[pymethods]
impl PyOverlayRecord {
    /// Read an overlay file
    ///
    /// Args:
    ///     path: Path to the .OVERLAY file (str or pathlib.Path)
    ///     strict: Raise when fewer abnormalities are retained than declared
    ///
    /// Raises:
    ///     OverlayError: Under strict mode, on a count mismatch
    #[staticmethod]
    #[pyo3(signature = (path, strict=false))]
    fn from_file(path: &Bound<'_, PyAny>, strict: bool) -> PyResult<PyOverlayRecord> {
        let path_buf = path_to_pathbuf(path)?;
        let inner = crate::parsing::parse_overlay_file(path_buf, policy(strict))
            .map_err(convert_error)?;
        Ok(PyOverlayRecord { inner })
    }

    /// Parse overlay text
    #[staticmethod]
    #[pyo3(signature = (content, name, strict=false))]
    fn parse(content: &str, name: &str, strict: bool) -> PyResult<PyOverlayRecord> {
        let inner =
            crate::parsing::parse_overlay(content, name, policy(strict)).map_err(convert_error)?;
        Ok(PyOverlayRecord { inner })
    }

    #[getter]
    fn name(&self) -> &str {
        &self.inner.name
    }

    #[getter]
    fn declared_count(&self) -> usize {
        self.inner.declared_count
    }

    #[getter]
    fn abnormalities(&self) -> Vec<PyAbnormality> {
        self.inner
            .abnormalities
            .iter()
            .cloned()
            .map(|inner| PyAbnormality { inner })
            .collect()
    }

    /// Messages for every dropped abnormality or core outline
    #[getter]
    fn issues(&self) -> Vec<String> {
        self.inner.issues.iter().map(ToString::to_string).collect()
    }

    /// Count mismatch message, if declared and retained counts differ
    fn count_mismatch(&self) -> Option<String> {
        self.inner.count_mismatch().map(|e| e.to_string())
    }

    fn __len__(&self) -> usize {
        self.inner.retained_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "OverlayRecord(name='{}', declared={}, retained={})",
            self.inner.name,
            self.inner.declared_count,
            self.inner.retained_count()
        )
    }
}

fn policy(strict: bool) -> MismatchPolicy {
    if strict {
        MismatchPolicy::Strict
    } else {
        MismatchPolicy::BestEffort
    }
}
