//! Cash flows and legs.
//!
//! A [`Leg`] is an ordered list of [`Cashflow`]s paid or received by the
//! holder. Floating coupons are the only cash flows that need index fixings;
//! [`Leg::fixing_requirements`] lists them so the simulation can keep the
//! fixing history consistent along a path.

mod coupon;
mod leg;

pub use coupon::{Cashflow, FixedCashflow, FixedRateCoupon, FloatingCoupon};
pub use leg::{Leg, LegSide};
