//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from valuing an instrument against a market
//! - `DateError`: Errors from date construction, parsing and arithmetic

use std::fmt;

use super::time::Date;

/// Pricing operation errors.
///
/// # Variants
/// - `InvalidInput`: Invalid input parameters
/// - `MissingFixing`: A past fixing required by a coupon is not in the store
/// - `MarketData`: A curve or index lookup failed
/// - `UnsupportedInstrument`: Instrument not supported by the pricer
///
/// # Examples
/// ```
/// use pricer_core::types::{Date, PricingError};
///
/// let err = PricingError::MissingFixing {
///     index: "EUR-EURIBOR-6M".to_string(),
///     date: Date::from_ymd(2024, 3, 1).unwrap(),
/// };
/// assert_eq!(format!("{}", err), "Missing fixing for EUR-EURIBOR-6M on 2024-03-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Invalid input parameters.
    InvalidInput(String),

    /// Historical fixing not available.
    MissingFixing {
        /// Index name.
        index: String,
        /// Fixing date.
        date: Date,
    },

    /// Market data lookup failure.
    MarketData(String),

    /// Unsupported instrument type.
    UnsupportedInstrument(String),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PricingError::MissingFixing { index, date } => {
                write!(f, "Missing fixing for {} on {}", index, date)
            }
            PricingError::MarketData(msg) => write!(f, "Market data error: {}", msg),
            PricingError::UnsupportedInstrument(msg) => {
                write!(f, "Unsupported instrument: {}", msg)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Date construction and parsing errors.
///
/// # Variants
/// - `InvalidDate`: Invalid year/month/day combination
/// - `ParseError`: Failed to parse a date string
/// - `InvalidTenor`: Failed to parse a tenor string
/// - `OutOfRange`: Date arithmetic left the representable range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components.
    InvalidDate {
        /// Year component.
        year: i32,
        /// Month component.
        month: u32,
        /// Day component.
        day: u32,
    },

    /// Parse error with description.
    ParseError(String),

    /// Tenor string not of the form `<n>D|W|M|Y`.
    InvalidTenor(String),

    /// Shifted date not representable.
    OutOfRange {
        /// Date being shifted.
        base: String,
        /// Shift applied.
        shift: String,
    },
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::InvalidDate { year, month, day } => {
                write!(f, "Invalid date: {}-{}-{}", year, month, day)
            }
            DateError::ParseError(msg) => write!(f, "Date parse error: {}", msg),
            DateError::InvalidTenor(s) => write!(f, "Invalid tenor: '{}'", s),
            DateError::OutOfRange { base, shift } => {
                write!(f, "Date out of range: {} + {}", base, shift)
            }
        }
    }
}

impl std::error::Error for DateError {}
