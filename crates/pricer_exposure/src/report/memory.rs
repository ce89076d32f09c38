//! Report kept in memory.

use super::{Column, ColumnType, Layout, Report, ReportError, ReportValue};

/// Keeps every row; used by tests and run summaries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReport {
    layout: Layout,
    rows: Vec<Vec<ReportValue>>,
}

impl InMemoryReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared columns.
    pub fn columns(&self) -> &[Column] {
        self.layout.columns()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.name == name)
    }

    /// Completed rows.
    pub fn rows(&self) -> &[Vec<ReportValue>] {
        &self.rows
    }

    /// Number of completed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was completed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&ReportValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }
}

impl Report for InMemoryReport {
    fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        precision: usize,
    ) -> Result<(), ReportError> {
        self.layout.add_column(name, column_type, precision)
    }

    fn next(&mut self) -> Result<(), ReportError> {
        if let Some(row) = self.layout.next()? {
            self.rows.push(row);
        }
        Ok(())
    }

    fn add(&mut self, value: ReportValue) -> Result<(), ReportError> {
        self.layout.add(value)
    }

    fn end(&mut self) -> Result<(), ReportError> {
        if let Some(row) = self.layout.end()? {
            self.rows.push(row);
        }
        Ok(())
    }
}
