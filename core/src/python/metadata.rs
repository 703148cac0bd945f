//! Python wrapper for CaseMetadata

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::enums::{PyInstitution, PyScanner, PySequence};
use super::errors::convert_error;
use super::utils::path_to_pathbuf;
use crate::parsing::CaseMetadata;
use crate::types::SequenceInfo;

/// Geometry of one scanned view
#[pyclass(name = "SequenceInfo", module = "ddsm")]
#[derive(Clone)]
pub struct PySequenceInfo {
    pub(crate) inner: SequenceInfo,
}

#[pymethods]
impl PySequenceInfo {
    /// Image height in pixels
    #[getter]
    fn height(&self) -> usize {
        self.inner.height
    }

    /// Image width in pixels
    #[getter]
    fn width(&self) -> usize {
        self.inner.width
    }

    #[getter]
    fn bits_per_pixel(&self) -> u32 {
        self.inner.bits_per_pixel
    }

    /// Scan resolution in microns per pixel
    #[getter]
    fn resolution(&self) -> f64 {
        self.inner.resolution
    }

    fn __repr__(&self) -> String {
        format!(
            "SequenceInfo(height={}, width={}, bits_per_pixel={}, resolution={})",
            self.inner.height, self.inner.width, self.inner.bits_per_pixel, self.inner.resolution
        )
    }
}

/// Case metadata read from a DDSM sidecar (.ics) file
#[pyclass(name = "CaseMetadata", module = "ddsm")]
#[derive(Clone)]
pub struct PyCaseMetadata {
    pub(crate) inner: CaseMetadata,
}

#[pymethods]
impl PyCaseMetadata {
    /// Read a sidecar file
    ///
    /// Args:
    ///     path: Path to the .ics file (str or pathlib.Path)
    ///
    /// Raises:
    ///     MetadataError: If a required field is missing or malformed
    ///
    /// Example:
    ///     >>> from ddsm import CaseMetadata
    ///     >>> meta = CaseMetadata.from_file("A-0029-1.ics")
    ///     >>> print(meta.institution, meta.sequence("LEFT_CC").height)
    #[staticmethod]
    fn from_file(path: &Bound<'_, PyAny>) -> PyResult<PyCaseMetadata> {
        let path_buf = path_to_pathbuf(path)?;
        let inner = crate::parsing::parse_ics_file(path_buf).map_err(convert_error)?;
        Ok(PyCaseMetadata { inner })
    }

    #[getter]
    fn file_name(&self) -> &str {
        &self.inner.file_name
    }

    #[getter]
    fn patient_id(&self) -> Option<String> {
        self.inner.patient_id.clone()
    }

    #[getter]
    fn age(&self) -> Option<u32> {
        self.inner.age
    }

    #[getter]
    fn scanner(&self) -> PyScanner {
        self.inner.scanner.into()
    }

    #[getter]
    fn institution(&self) -> PyInstitution {
        self.inner.institution.into()
    }

    /// Breast density (1-4), if recorded
    #[getter]
    fn density(&self) -> Option<u8> {
        self.inner.density
    }

    /// Views listed in the sidecar
    #[getter]
    fn sequences(&self) -> Vec<PySequence> {
        self.inner.sequences.keys().map(|s| (*s).into()).collect()
    }

    /// Geometry of a view, by key ("LEFT_CC") or Sequence
    ///
    /// Raises:
    ///     MetadataError: If the sidecar does not list the view
    fn sequence(&self, sequence: &Bound<'_, PyAny>) -> PyResult<PySequenceInfo> {
        let sequence = match sequence.extract::<PySequence>() {
            Ok(seq) => seq.inner,
            Err(_) => {
                let key: String = sequence.extract()?;
                PySequence::from_key(&key)?.inner
            }
        };
        let info = self.inner.sequence(sequence).map_err(convert_error)?;
        Ok(PySequenceInfo { inner: *info })
    }

    /// Convert to a Python dictionary
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new_bound(py);
        dict.set_item("file_name", &self.inner.file_name)?;
        dict.set_item("patient_id", self.inner.patient_id.clone())?;
        dict.set_item("age", self.inner.age)?;
        dict.set_item("scanner", self.inner.scanner.simple_name())?;
        dict.set_item("institution", self.inner.institution.simple_name())?;
        dict.set_item("density", self.inner.density)?;

        let sequences = PyDict::new_bound(py);
        for (sequence, info) in &self.inner.sequences {
            let entry = PyDict::new_bound(py);
            entry.set_item("height", info.height)?;
            entry.set_item("width", info.width)?;
            entry.set_item("bits_per_pixel", info.bits_per_pixel)?;
            entry.set_item("resolution", info.resolution)?;
            sequences.set_item(sequence.key(), entry)?;
        }
        dict.set_item("sequences", sequences)?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "CaseMetadata(file_name='{}', scanner={}, institution={}, sequences={})",
            self.inner.file_name,
            self.inner.scanner,
            self.inner.institution,
            self.inner.sequences.len()
        )
    }
}
