//! Instrument construction errors.

use crate::schedules::ScheduleError;
use pricer_core::types::DateError;
use thiserror::Error;

/// Errors raised while building an instrument.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InstrumentError {
    /// Parameter outside its valid range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Schedule generation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Date arithmetic failed.
    #[error(transparent)]
    Date(#[from] DateError),
}
