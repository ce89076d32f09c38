//! Model errors.

use pricer_core::market_data::MarketDataError;
use thiserror::Error;

/// Errors raised by stochastic models.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Parameter outside its valid range.
    #[error("Invalid model parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Constraint violated.
        reason: &'static str,
    },

    /// Initial curve lookup failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}
