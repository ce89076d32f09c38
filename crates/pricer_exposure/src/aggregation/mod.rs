//! Post-simulation aggregation.
//!
//! Everything here reads finished cubes; nothing runs while the engine is
//! still filling them.
//!
//! - [`netting`]: trade values netted per netting set
//! - [`exposure`]: EE, ENE, PFE and close-out exposure profiles
//! - [`cva`]: unilateral CVA from exposure and survival probabilities
//! - [`dim`]: dynamic initial margin calculators

pub mod cva;
pub mod dim;
pub mod exposure;
pub mod netting;

pub use cva::{cva_by_netting_set, expected_survival, unilateral_cva, CvaResult};
pub use dim::{
    DimCalculator, DimError, DimSeries, DirectDimCalculator, DynamicSimmCalculator, ImScaling,
};
pub use exposure::{export_exposure_profiles, exposure_profiles, ExposureProfile};
pub use netting::net_trade_values;

use crate::cube::CubeError;
use crate::report::ReportError;
use thiserror::Error;

/// Aggregation errors.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Cube read failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// Report output failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Confidence level outside `(0, 1)`.
    #[error("Invalid confidence level {0}: must be in (0, 1)")]
    InvalidConfidence(f64),

    /// Cube shape does not match the portfolio.
    #[error("Cube does not match portfolio: {0}")]
    Mismatch(String),

    /// Id not present in a cube or portfolio.
    #[error("Unknown id '{0}'")]
    UnknownId(String),
}
