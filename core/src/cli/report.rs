use crate::annotation::{AnnotationRow, COLUMNS};
use crate::api::BatchReport;
use std::fmt;

/// CSV formatter for annotation rows
pub struct CsvReport<'a> {
    rows: &'a [AnnotationRow],
}

impl<'a> CsvReport<'a> {
    /// Creates a new CSV report
    pub fn new(rows: &'a [AnnotationRow]) -> Self {
        Self { rows }
    }
}

impl<'a> fmt::Display for CsvReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", COLUMNS.join(","))?;
        for row in self.rows {
            let fields: Vec<String> = row.fields().iter().map(|s| escape_field(s)).collect();
            writeln!(f, "{}", fields.join(","))?;
        }
        Ok(())
    }
}

/// Quotes a field containing a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Text summary of a batch conversion
pub struct TextReport<'a> {
    report: &'a BatchReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a BatchReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DDSM Conversion Summary")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Images found:     {}", self.report.images_found)?;
        writeln!(f, "Images converted: {}", self.report.images_written)?;
        writeln!(f, "Image failures:   {}", self.report.image_failures)?;
        writeln!(f, "Case failures:    {}", self.report.case_failures.len())?;
        writeln!(f, "Warnings:         {}", self.report.warnings)?;
        writeln!(f, "Annotation rows:  {}", self.report.tables.total_rows())?;
        writeln!(f)?;

        writeln!(f, "Tables")?;
        writeln!(f, "------")?;
        for (category, table) in self.report.tables.iter() {
            writeln!(f, "{}: {} rows", category, table.len())?;
        }

        if !self.report.case_failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed Cases")?;
            writeln!(f, "------------")?;
            for (image, reason) in &self.report.case_failures {
                writeln!(f, "{}: {}", image, reason)?;
            }
        }

        Ok(())
    }
}
