//! Cube errors.

use thiserror::Error;

/// Which cube axis an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeAxis {
    /// Trade, counterparty or netting set.
    Id,
    /// Simulation date.
    Date,
    /// Monte Carlo sample.
    Sample,
    /// Depth slot.
    Depth,
}

impl std::fmt::Display for CubeAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CubeAxis::Id => "id",
            CubeAxis::Date => "date",
            CubeAxis::Sample => "sample",
            CubeAxis::Depth => "depth",
        };
        f.write_str(name)
    }
}

/// Errors raised by cube construction and access.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CubeError {
    /// Index beyond its dimension.
    #[error("{axis} index {index} out of range (size {size})")]
    IndexOutOfRange {
        /// Axis of the offending index.
        axis: CubeAxis,
        /// Requested index.
        index: usize,
        /// Dimension size.
        size: usize,
    },

    /// A cell was read before anything was written to it.
    #[error("Unwritten cell: id {id}, date {date:?}, sample {sample:?}, depth {depth}")]
    UnwrittenCell {
        /// Id index.
        id: usize,
        /// Date index, `None` for the T0 slice.
        date: Option<usize>,
        /// Sample index, `None` for the T0 slice.
        sample: Option<usize>,
        /// Depth index.
        depth: usize,
    },

    /// Values must be finite; NaN marks unwritten cells.
    #[error("Non-finite value {0} rejected")]
    NonFiniteValue(f64),

    /// Cube dimensions rejected at construction.
    #[error("Invalid cube dimensions: {0}")]
    InvalidDimensions(String),

    /// Two ids with the same name.
    #[error("Duplicate cube id: {0}")]
    DuplicateId(String),
}
