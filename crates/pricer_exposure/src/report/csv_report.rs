//! File-backed CSV report.

use super::{ColumnType, Layout, Report, ReportError, ReportValue};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Streams rows to a CSV file.
///
/// The header is written with the first row; values are formatted with the
/// precision of their column. [`Report::end`] flushes the file.
#[derive(Debug)]
pub struct CsvReport {
    layout: Layout,
    writer: csv::Writer<File>,
    path: PathBuf,
    header_written: bool,
    rows: usize,
}

impl CsvReport {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::Writer::from_path(&path)?;
        Ok(Self {
            layout: Layout::default(),
            writer,
            path,
            header_written: false,
            rows: 0,
        })
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&mut self) -> Result<(), ReportError> {
        if !self.header_written {
            let names: Vec<&str> = self.layout.columns().iter().map(|c| c.name.as_str()).collect();
            self.writer.write_record(&names)?;
            self.header_written = true;
        }
        Ok(())
    }

    fn write_row(&mut self, row: Option<Vec<ReportValue>>) -> Result<(), ReportError> {
        if let Some(row) = row {
            let record = self.layout.format_row(&row);
            self.writer.write_record(&record)?;
            self.rows += 1;
        }
        Ok(())
    }
}

impl Report for CsvReport {
    fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        precision: usize,
    ) -> Result<(), ReportError> {
        self.layout.add_column(name, column_type, precision)
    }

    fn next(&mut self) -> Result<(), ReportError> {
        let previous = self.layout.next()?;
        self.write_header()?;
        self.write_row(previous)
    }

    fn add(&mut self, value: ReportValue) -> Result<(), ReportError> {
        self.layout.add(value)
    }

    fn end(&mut self) -> Result<(), ReportError> {
        let last = self.layout.end()?;
        self.write_header()?;
        self.write_row(last)?;
        self.writer.flush()?;
        info!(path = %self.path.display(), rows = self.rows, "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_csv_report_file() {
        let path = env::temp_dir().join("pricer_exposure_csv_report_test.csv");
        let mut report = CsvReport::create(&path).unwrap();
        report.add_column("Id", ColumnType::Text, 0).unwrap();
        report.add_column("Value", ColumnType::Real, 3).unwrap();
        report.next().unwrap();
        report.add("X".into()).unwrap();
        report.add(1.23456.into()).unwrap();
        report.end().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Id,Value\nX,1.235\n");
        fs::remove_file(path).ok();
    }
}
