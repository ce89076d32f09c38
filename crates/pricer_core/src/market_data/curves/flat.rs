//! Flat yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Yield curve with a single continuously compounded rate.
///
/// Every tenor shares the same zero and forward rate, so `D(t) = exp(-r t)`.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::curves::{FlatCurve, YieldCurve};
///
/// let curve = FlatCurve::new(0.02_f64);
/// assert!((curve.discount_factor(0.0).unwrap() - 1.0).abs() < 1e-15);
/// assert_eq!(curve.forward_rate(1.0, 2.0).unwrap(), 0.02);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve<T: Float> {
    /// Continuously compounded rate applied at every tenor.
    rate: T,
}

impl<T: Float> FlatCurve<T> {
    /// Creates a flat curve; negative rates are allowed.
    ///
    /// # Arguments
    ///
    /// * `rate` - Continuously compounded rate
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::market_data::curves::{FlatCurve, YieldCurve};
    ///
    /// let curve = FlatCurve::new(-0.005_f64);
    /// assert_eq!(curve.rate(), -0.005);
    /// assert!(curve.discount_factor(2.0).unwrap() > 1.0);
    /// ```
    #[inline]
    pub fn new(rate: T) -> Self {
        Self { rate }
    }

    /// The constant rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }
}

impl<T: Float> YieldCurve<T> for FlatCurve<T> {
    /// `exp(-r t)`; fails with `InvalidMaturity` for `t < 0`.
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok((-self.rate * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate)
    }

    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        if t2 <= t1 {
            return Err(MarketDataError::InvalidMaturity {
                t: (t2 - t1).to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate)
    }
}
