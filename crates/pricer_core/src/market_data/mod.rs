//! Market data structures for the simulated market.
//!
//! All curve traits are generic over `T: Float`; the simulation runs them with
//! `f64`.
//!
//! # Components
//!
//! - [`curves`]: Yield and credit curve traits with flat and pillar-based
//!   implementations
//! - [`error`]: Market data error types (MarketDataError)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{CreditCurve, FlatCurve, FlatHazardRateCurve, YieldCurve};
//!
//! let curve = FlatCurve::new(0.05_f64);
//! let df = curve.discount_factor(1.0).unwrap();
//! assert!((df - 0.951229).abs() < 1e-5);
//!
//! let credit = FlatHazardRateCurve::new(0.02_f64).unwrap();
//! assert!((credit.survival_probability(1.0).unwrap() - 0.980199).abs() < 1e-6);
//! ```

pub mod curves;
pub mod error;

pub use curves::{
    CreditCurve, CreditCurveEnum, CurveEnum, FlatCurve, FlatHazardRateCurve, HazardRateCurve,
    YieldCurve, ZeroCurve,
};
pub use error::MarketDataError;
