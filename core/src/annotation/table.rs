use crate::cli::report::CsvReport;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::row::AnnotationRow;

/// Append-only annotation table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    rows: Vec<AnnotationRow>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Appends rows at the end, keeping their order
    pub fn append(&mut self, rows: impl IntoIterator<Item = AnnotationRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[AnnotationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as CSV with a header line
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{}", CsvReport::new(&self.rows))?;
        writer.flush()
    }

    /// Writes the table as CSV to a file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }
}

/// Per-category tables for a whole batch
///
/// Case pipelines collect their rows locally; merging happens through
/// `&mut self`, so a single owner appends and rows never interleave.
#[derive(Debug, Clone, Default)]
pub struct BatchTables {
    tables: BTreeMap<String, AnnotationTable>,
}

impl BatchTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one case's rows to its category table
    pub fn merge(&mut self, category: &str, rows: Vec<AnnotationRow>) {
        self.tables
            .entry(category.to_string())
            .or_default()
            .append(rows);
    }

    /// Table of a category, if any rows or cases were merged into it
    pub fn table(&self, category: &str) -> Option<&AnnotationTable> {
        self.tables.get(category)
    }

    /// Categories and tables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of rows across categories
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(AnnotationTable::len).sum()
    }

    /// Writes `<dir>/<category>.csv` for every category
    pub fn save_all<P: AsRef<Path>>(&self, dir: P) -> io::Result<Vec<std::path::PathBuf>> {
        let mut written = Vec::with_capacity(self.tables.len());
        for (category, table) in &self.tables {
            let path = dir.as_ref().join(format!("{}.csv", category));
            table.save_csv(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Point};
    use std::fs;

    fn row(name: &str, x: i32) -> AnnotationRow {
        AnnotationRow {
            name: name.to_string(),
            feature: "MASS".to_string(),
            severity: Some("BENIGN".to_string()),
            bbox: BoundingBox::new(Point::new(x, 2), Point::new(x + 3, 6)),
            height: 100,
            width: 80,
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut table = AnnotationTable::new();
        table.append(vec![row("a.png", 1), row("b.png", 2)]);
        table.append(vec![row("c.png", 3)]);
        let names: Vec<_> = table.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_write_csv() {
        let mut table = AnnotationTable::new();
        table.append(vec![row("a.png", 1)]);
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "NAME,FEATURE,SEVERITY,X1,Y1,X2,Y2,HEIGHT,WIDTH\na.png,MASS,BENIGN,1,2,4,6,100,80\n"
        );
    }

    #[test]
    fn test_batch_merge_by_category() {
        let mut batch = BatchTables::new();
        batch.merge("cancers", vec![row("a.png", 1)]);
        batch.merge("benigns", vec![row("b.png", 1), row("c.png", 1)]);
        batch.merge("cancers", vec![]);
        assert_eq!(batch.total_rows(), 3);
        assert_eq!(batch.table("cancers").unwrap().len(), 1);
        let categories: Vec<_> = batch.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, vec!["benigns", "cancers"]);
    }

    #[test]
    fn test_save_all() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut batch = BatchTables::new();
        batch.merge("benigns", vec![row("b.png", 1)]);
        let written = batch.save_all(dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("benigns.csv")]);
        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with("NAME,FEATURE"));
        assert!(text.contains("b.png"));
    }
}
