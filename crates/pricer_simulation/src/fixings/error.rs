//! Fixing manager errors.

use pricer_core::types::Date;
use thiserror::Error;

/// Errors raised by the fixing manager.
///
/// `UncapturedIndex` is an invariant violation: `initialise` enumerates every
/// index the portfolio references, so a write to any other index means the
/// caller bypassed it. The engine aborts the run on it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixingError {
    /// `update` called before `initialise`.
    #[error("Fixing manager used before initialise")]
    NotInitialised,

    /// Write to an index that was not captured by `initialise`.
    #[error("Index {index} has no captured fixing history")]
    UncapturedIndex {
        /// Index name.
        index: String,
    },

    /// Dates must be visited in increasing order within a path.
    #[error("Fixing update to {target} precedes current date {current}")]
    NonMonotonicDate {
        /// Requested date.
        target: Date,
        /// Date already reached.
        current: Date,
    },

    /// The simulated market produced no fixing for an index.
    #[error("No simulated fixing for {index} on {date}")]
    MissingSimulatedFixing {
        /// Index name.
        index: String,
        /// Simulation date.
        date: Date,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FixingError::UncapturedIndex {
            index: "USD-SOFR".to_string(),
        };
        assert_eq!(format!("{}", err), "Index USD-SOFR has no captured fixing history");
    }
}
