//! Curve abstractions for interest rate and credit calculations.
//!
//! This module provides:
//! - [`YieldCurve`]: Generic trait for discount factor and rate calculations
//! - [`FlatCurve`]: Constant rate yield curve
//! - [`ZeroCurve`]: Pillar-based curve, linear in zero rates
//! - [`CurveEnum`]: Static dispatch over the yield curve implementations
//! - [`CreditCurve`]: Generic trait for hazard rate and survival probability
//! - [`FlatHazardRateCurve`], [`HazardRateCurve`]: Credit curve implementations
//! - [`CreditCurveEnum`]: Static dispatch over the credit curve implementations

mod credit;
mod curve_enum;
mod flat;
mod traits;
mod zero;

pub use credit::{CreditCurve, CreditCurveEnum, FlatHazardRateCurve, HazardRateCurve};
pub use curve_enum::CurveEnum;
pub use flat::FlatCurve;
pub use traits::YieldCurve;
pub use zero::ZeroCurve;
