//! Error types for the exposure-cube CLI.

use crate::config::ConfigError;
use pricer_exposure::aggregation::{AggregationError, DimError};
use pricer_exposure::engine::EngineError;
use pricer_exposure::output::CubeWriterError;
use pricer_exposure::report::ReportError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A validated configuration could not be turned into engine inputs.
    #[error("Set-up error: {0}")]
    Setup(String),

    /// Simulation failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Netting, exposure or CVA failed.
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// DIM failed.
    #[error("DIM error: {0}")]
    Dim(#[from] DimError),

    /// Report export failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Cube export failed.
    #[error("Cube export error: {0}")]
    CubeWriter(#[from] CubeWriterError),

    /// Run summary serialisation failed.
    #[error("Summary error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Creates a set-up error.
    pub fn setup(msg: impl std::fmt::Display) -> Self {
        Self::Setup(msg.to_string())
    }
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::setup("unknown index EUR-6M");
        assert_eq!(err.to_string(), "Set-up error: unknown index EUR-6M");
        let err = CliError::from(ConfigError::Validation(vec!["a".to_string(), "b".to_string()]));
        assert!(err.to_string().contains("a; b"));
    }
}
