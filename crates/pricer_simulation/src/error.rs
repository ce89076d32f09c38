//! Simulation layer errors.

use crate::fixings::FixingError;
use pricer_core::market_data::MarketDataError;
use pricer_core::types::{DateError, PricingError};
use pricer_models::models::ModelError;
use thiserror::Error;

/// Invalid simulation configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample count outside `[1, MAX_SAMPLES]`.
    #[error("Invalid sample count {0}: must be in range [1, 1_000_000]")]
    InvalidSampleCount(usize),

    /// Thread count of zero.
    #[error("Invalid thread count {0}: must be positive")]
    InvalidThreadCount(usize),

    /// Required builder field not set.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),
}

/// Errors raised while generating scenarios or pricing on them.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Model construction or evaluation failed.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Curve lookup failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Instrument pricing failed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Fixing manager invariant violated.
    #[error("Fixing error: {0}")]
    Fixing(#[from] FixingError),

    /// Date arithmetic failed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Simulation dates not usable.
    #[error("Invalid simulation dates: {0}")]
    InvalidDates(String),

    /// Configuration rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<SimulationError> for PricingError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Pricing(inner) => inner,
            other => PricingError::MarketData(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::InvalidSampleCount(0)
            .to_string()
            .contains("Invalid sample count 0"));
        assert_eq!(
            ConfigError::MissingParameter("samples").to_string(),
            "Missing required parameter 'samples'"
        );
    }

    #[test]
    fn test_pricing_error_passes_through() {
        let err = SimulationError::Pricing(PricingError::InvalidInput("x".to_string()));
        assert_eq!(
            PricingError::from(err),
            PricingError::InvalidInput("x".to_string())
        );

        let err = SimulationError::InvalidDates("empty".to_string());
        assert!(matches!(PricingError::from(err), PricingError::MarketData(_)));
    }
}
