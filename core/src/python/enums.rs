//! Python wrappers for ddsm enums

use pyo3::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::macros::impl_py_from;
use crate::types::{Institution, OutputMode, Scanner, Sequence};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Scanner
// ============================================================================

#[pyclass(name = "Scanner", module = "ddsm")]
#[derive(Clone, Debug)]
pub struct PyScanner {
    pub(crate) inner: Scanner,
}

#[pymethods]
impl PyScanner {
    #[classattr]
    const DBA: Self = Self {
        inner: Scanner::Dba,
    };
    #[classattr]
    const HOWTEK: Self = Self {
        inner: Scanner::Howtek,
    };
    #[classattr]
    const LUMISYS: Self = Self {
        inner: Scanner::Lumisys,
    };

    fn __str__(&self) -> String {
        self.inner.simple_name().to_string()
    }

    fn __repr__(&self) -> String {
        format!("Scanner.{}", self.inner.simple_name())
    }

    fn __eq__(&self, other: &PyScanner) -> bool {
        self.inner == other.inner
    }

    fn __hash__(&self) -> u64 {
        hash_of(&self.inner)
    }

    #[getter]
    fn value(&self) -> &str {
        self.inner.simple_name()
    }
}

impl_py_from!(PyScanner, Scanner);

// ============================================================================
// Institution
// ============================================================================

#[pyclass(name = "Institution", module = "ddsm")]
#[derive(Clone, Debug)]
pub struct PyInstitution {
    pub(crate) inner: Institution,
}

#[pymethods]
impl PyInstitution {
    #[classattr]
    const MGH: Self = Self {
        inner: Institution::Mgh,
    };
    #[classattr]
    const WFU: Self = Self {
        inner: Institution::Wfu,
    };
    #[classattr]
    const ISMD: Self = Self {
        inner: Institution::Ismd,
    };

    fn __str__(&self) -> String {
        self.inner.simple_name().to_string()
    }

    fn __repr__(&self) -> String {
        format!("Institution.{}", self.inner.simple_name())
    }

    fn __eq__(&self, other: &PyInstitution) -> bool {
        self.inner == other.inner
    }

    fn __hash__(&self) -> u64 {
        hash_of(&self.inner)
    }

    #[getter]
    fn value(&self) -> &str {
        self.inner.simple_name()
    }
}

impl_py_from!(PyInstitution, Institution);

// ============================================================================
// Sequence
// ============================================================================

#[pyclass(name = "Sequence", module = "ddsm")]
#[derive(Clone, Debug)]
pub struct PySequence {
    pub(crate) inner: Sequence,
}

#[pymethods]
impl PySequence {
    #[classattr]
    const LEFT_CC: Self = Self {
        inner: Sequence::LeftCc,
    };
    #[classattr]
    const RIGHT_CC: Self = Self {
        inner: Sequence::RightCc,
    };
    #[classattr]
    const LEFT_MLO: Self = Self {
        inner: Sequence::LeftMlo,
    };
    #[classattr]
    const RIGHT_MLO: Self = Self {
        inner: Sequence::RightMlo,
    };

    /// Parse a sequence key such as "LEFT_CC"
    #[staticmethod]
    pub fn from_key(key: &str) -> PyResult<PySequence> {
        Sequence::parse(key).map(Into::into).ok_or_else(|| {
            pyo3::exceptions::PyValueError::new_err(format!("unknown sequence '{}'", key))
        })
    }

    /// Breast laterality ("left" or "right")
    #[getter]
    fn laterality(&self) -> &str {
        self.inner.laterality().simple_name()
    }

    /// View position ("cc" or "mlo")
    #[getter]
    fn view(&self) -> &str {
        self.inner.view().simple_name()
    }

    fn __str__(&self) -> String {
        self.inner.key().to_string()
    }

    fn __repr__(&self) -> String {
        format!("Sequence.{}", self.inner.key())
    }

    fn __eq__(&self, other: &PySequence) -> bool {
        self.inner == other.inner
    }

    fn __hash__(&self) -> u64 {
        hash_of(&self.inner)
    }

    fn __lt__(&self, other: &PySequence) -> bool {
        self.inner < other.inner
    }

    #[getter]
    fn value(&self) -> &str {
        self.inner.key()
    }
}

impl_py_from!(PySequence, Sequence);

// ============================================================================
// OutputMode
// ============================================================================

#[pyclass(name = "OutputMode", module = "ddsm")]
#[derive(Clone, Debug)]
pub struct PyOutputMode {
    pub(crate) inner: OutputMode,
}

#[pymethods]
impl PyOutputMode {
    #[classattr]
    const CORRECTION: Self = Self {
        inner: OutputMode::Correction,
    };
    #[classattr]
    const NORMALIZE: Self = Self {
        inner: OutputMode::Normalize,
    };

    fn __repr__(&self) -> String {
        format!("OutputMode.{:?}", self.inner)
    }

    fn __eq__(&self, other: &PyOutputMode) -> bool {
        self.inner == other.inner
    }
}

impl_py_from!(PyOutputMode, OutputMode);
