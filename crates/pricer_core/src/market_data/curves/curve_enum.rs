//! Static dispatch over the yield curve implementations.

use super::{FlatCurve, YieldCurve, ZeroCurve};
use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Yield curve enum used by the simulated market.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveEnum<T: Float> {
    /// Constant rate.
    Flat(FlatCurve<T>),
    /// Linear zero rates between pillars.
    Zero(ZeroCurve<T>),
}

impl<T: Float> CurveEnum<T> {
    /// Convenience constructor for a flat curve.
    #[inline]
    pub fn flat(rate: T) -> Self {
        CurveEnum::Flat(FlatCurve::new(rate))
    }
}

impl<T: Float> YieldCurve<T> for CurveEnum<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        match self {
            CurveEnum::Flat(curve) => curve.discount_factor(t),
            CurveEnum::Zero(curve) => curve.discount_factor(t),
        }
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        match self {
            CurveEnum::Flat(curve) => curve.zero_rate(t),
            CurveEnum::Zero(curve) => curve.zero_rate(t),
        }
    }

    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        match self {
            CurveEnum::Flat(curve) => curve.forward_rate(t1, t2),
            CurveEnum::Zero(curve) => curve.forward_rate(t1, t2),
        }
    }
}

impl<T: Float> From<FlatCurve<T>> for CurveEnum<T> {
    fn from(curve: FlatCurve<T>) -> Self {
        CurveEnum::Flat(curve)
    }
}

impl<T: Float> From<ZeroCurve<T>> for CurveEnum<T> {
    fn from(curve: ZeroCurve<T>) -> Self {
        CurveEnum::Zero(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dispatch_matches_inner_curve() {
        let zero = ZeroCurve::new(&[1.0_f64, 3.0], &[0.01, 0.02]).unwrap();
        let wrapped: CurveEnum<f64> = zero.clone().into();
        assert_relative_eq!(
            wrapped.discount_factor(2.0).unwrap(),
            zero.discount_factor(2.0).unwrap(),
            epsilon = 1e-15
        );
        assert_eq!(CurveEnum::flat(0.01_f64).zero_rate(4.0).unwrap(), 0.01);
    }
}
