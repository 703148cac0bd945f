//! Bounding-box projection of overlay annotations
//!
//! Reduces each retained abnormality to one tabular row and collects rows
//! into append-only tables.

mod row;
mod table;

pub use row::{image_file_name, project_annotations, AnnotationRow, Projection, COLUMNS};
pub use table::{AnnotationTable, BatchTables};
