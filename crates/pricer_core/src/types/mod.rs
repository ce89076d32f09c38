//! Core types for the exposure engine.
//!
//! This module provides:
//! - Time types: `Date`, `Tenor`, `DayCountConvention` (`time`)
//! - Error types: `PricingError`, `DateError` (`error`)

pub mod error;
pub mod time;

pub use error::{DateError, PricingError};
pub use time::{Date, DayCountConvention, Tenor, TimeUnit};
