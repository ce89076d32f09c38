//! Tabular report sinks.
//!
//! A [`Report`] is filled column by column, then row by row:
//!
//! ```text
//! add_column* (next add*)* end
//! ```
//!
//! Every value must match the type of its column. [`InMemoryReport`] keeps
//! the rows for inspection, [`CsvReport`] streams them to a file.

mod csv_report;
mod memory;

pub use csv_report::CsvReport;
pub use memory::InMemoryReport;

use pricer_core::types::Date;
use std::fmt;
use thiserror::Error;

/// Report construction and output errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// `add_column` called after the first row.
    #[error("Cannot add column '{0}' after rows were started")]
    ColumnAfterRows(String),

    /// `add` called before `next`.
    #[error("No row started")]
    NoRow,

    /// More values than columns in a row.
    #[error("Row has more than {columns} values")]
    TooManyValues {
        /// Number of columns.
        columns: usize,
    },

    /// A row ended with missing values.
    #[error("Row has {got} values, expected {expected}")]
    IncompleteRow {
        /// Number of columns.
        expected: usize,
        /// Values given.
        got: usize,
    },

    /// Value type differs from the column type.
    #[error("Column '{column}' expects {expected}, got {got}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Column type.
        expected: ColumnType,
        /// Value type.
        got: ColumnType,
    },

    /// Report already ended.
    #[error("Report already ended")]
    Ended,

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Type of a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Non-negative integer.
    Size,
    /// Floating point number.
    Real,
    /// Free text.
    Text,
    /// Calendar date.
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Size => "Size",
            ColumnType::Real => "Real",
            ColumnType::Text => "Text",
            ColumnType::Date => "Date",
        };
        f.write_str(name)
    }
}

/// One report cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    /// Integer value.
    Size(usize),
    /// Real value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Date value.
    Date(Date),
}

impl ReportValue {
    /// Column type this value fits.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ReportValue::Size(_) => ColumnType::Size,
            ReportValue::Real(_) => ColumnType::Real,
            ReportValue::Text(_) => ColumnType::Text,
            ReportValue::Date(_) => ColumnType::Date,
        }
    }

    /// Text form; reals are printed with `precision` decimals, dates as
    /// ISO-8601.
    pub fn format(&self, precision: usize) -> String {
        match self {
            ReportValue::Size(n) => n.to_string(),
            ReportValue::Real(x) => format!("{:.*}", precision, x),
            ReportValue::Text(s) => s.clone(),
            ReportValue::Date(d) => d.to_string(),
        }
    }

    /// The real value, if this is one.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ReportValue::Real(x) => Some(*x),
            _ => None,
        }
    }
}

impl From<usize> for ReportValue {
    fn from(n: usize) -> Self {
        ReportValue::Size(n)
    }
}

impl From<f64> for ReportValue {
    fn from(x: f64) -> Self {
        ReportValue::Real(x)
    }
}

impl From<&str> for ReportValue {
    fn from(s: &str) -> Self {
        ReportValue::Text(s.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(s: String) -> Self {
        ReportValue::Text(s)
    }
}

impl From<Date> for ReportValue {
    fn from(d: Date) -> Self {
        ReportValue::Date(d)
    }
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header name.
    pub name: String,
    /// Value type.
    pub column_type: ColumnType,
    /// Decimals printed for reals.
    pub precision: usize,
}

/// A tabular output sink.
pub trait Report {
    /// Declares the next column. Only valid before the first row.
    fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        precision: usize,
    ) -> Result<(), ReportError>;

    /// Starts a new row, completing the previous one.
    fn next(&mut self) -> Result<(), ReportError>;

    /// Adds the next value of the current row.
    fn add(&mut self, value: ReportValue) -> Result<(), ReportError>;

    /// Completes the last row and flushes the output.
    fn end(&mut self) -> Result<(), ReportError>;
}

/// Column and row bookkeeping shared by the sinks.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    columns: Vec<Column>,
    row: Option<Vec<ReportValue>>,
    started: bool,
    ended: bool,
}

impl Layout {
    pub(crate) fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        precision: usize,
    ) -> Result<(), ReportError> {
        if self.ended {
            return Err(ReportError::Ended);
        }
        if self.started {
            return Err(ReportError::ColumnAfterRows(name.to_string()));
        }
        self.columns.push(Column {
            name: name.to_string(),
            column_type,
            precision,
        });
        Ok(())
    }

    /// Starts a row; returns the completed previous row, if any.
    pub(crate) fn next(&mut self) -> Result<Option<Vec<ReportValue>>, ReportError> {
        if self.ended {
            return Err(ReportError::Ended);
        }
        let previous = self.finish_row()?;
        self.started = true;
        self.row = Some(Vec::with_capacity(self.columns.len()));
        Ok(previous)
    }

    pub(crate) fn add(&mut self, value: ReportValue) -> Result<(), ReportError> {
        if self.ended {
            return Err(ReportError::Ended);
        }
        let columns = self.columns.len();
        let row = self.row.as_mut().ok_or(ReportError::NoRow)?;
        let column = self
            .columns
            .get(row.len())
            .ok_or(ReportError::TooManyValues { columns })?;
        if value.column_type() != column.column_type {
            return Err(ReportError::TypeMismatch {
                column: column.name.clone(),
                expected: column.column_type,
                got: value.column_type(),
            });
        }
        row.push(value);
        Ok(())
    }

    /// Ends the report; returns the completed last row, if any.
    pub(crate) fn end(&mut self) -> Result<Option<Vec<ReportValue>>, ReportError> {
        if self.ended {
            return Err(ReportError::Ended);
        }
        let last = self.finish_row()?;
        self.ended = true;
        Ok(last)
    }

    fn finish_row(&mut self) -> Result<Option<Vec<ReportValue>>, ReportError> {
        match self.row.take() {
            Some(row) if row.len() != self.columns.len() => Err(ReportError::IncompleteRow {
                expected: self.columns.len(),
                got: row.len(),
            }),
            other => Ok(other),
        }
    }

    pub(crate) fn format_row(&self, row: &[ReportValue]) -> Vec<String> {
        row.iter()
            .zip(&self.columns)
            .map(|(value, column)| value.format(column.precision))
            .collect()
    }
}
