pub mod annotation;
pub mod api;
pub mod calibration;
pub mod cli;
pub mod decode;
pub mod error;
pub mod parsing;
pub mod types;

#[cfg(feature = "python")]
pub mod python;

pub use annotation::{AnnotationRow, AnnotationTable, BatchTables};
pub use api::{BatchReport, ImageCase, ImageConverter, ImageOutcome};
pub use cli::report::{CsvReport, TextReport};
pub use error::{DdsmError, Result};
pub use parsing::{CaseMetadata, OverlayRecord};
pub use types::*;
