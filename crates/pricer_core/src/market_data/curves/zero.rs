//! Pillar-based zero rate curve.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Yield curve interpolating continuously compounded zero rates linearly
/// between pillars, flat beyond the first and last pillar.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::curves::{YieldCurve, ZeroCurve};
///
/// let curve = ZeroCurve::new(&[1.0_f64, 5.0], &[0.01, 0.03]).unwrap();
/// assert!((curve.zero_rate(3.0).unwrap() - 0.02).abs() < 1e-12);
/// assert!((curve.zero_rate(10.0).unwrap() - 0.03).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCurve<T: Float> {
    times: Vec<T>,
    rates: Vec<T>,
}

impl<T: Float> ZeroCurve<T> {
    /// Builds the curve from strictly increasing positive pillar times.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if no pillars are given or lengths differ
    /// - `InvalidMaturity` if a pillar time is non-positive or not increasing
    pub fn new(times: &[T], rates: &[T]) -> Result<Self, MarketDataError> {
        if times.is_empty() || times.len() != rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: times.len().max(1),
            });
        }
        for (i, &t) in times.iter().enumerate() {
            if t <= T::zero() || (i > 0 && t <= times[i - 1]) {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(0.0),
                });
            }
        }
        Ok(Self {
            times: times.to_vec(),
            rates: rates.to_vec(),
        })
    }

    /// Pillar times.
    #[inline]
    pub fn times(&self) -> &[T] {
        &self.times
    }

    fn interpolated_rate(&self, t: T) -> T {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.rates[0];
        }
        if t >= self.times[last] {
            return self.rates[last];
        }
        let upper = self.times.partition_point(|&x| x < t);
        let (t0, t1) = (self.times[upper - 1], self.times[upper]);
        let (r0, r1) = (self.rates[upper - 1], self.rates[upper]);
        r0 + (r1 - r0) * (t - t0) / (t1 - t0)
    }
}

impl<T: Float> YieldCurve<T> for ZeroCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok((-self.interpolated_rate(t) * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pillar_rates_are_reproduced() {
        let curve = ZeroCurve::new(&[0.5_f64, 2.0, 10.0], &[0.01, 0.02, 0.025]).unwrap();
        assert_relative_eq!(curve.zero_rate(2.0).unwrap(), 0.02, epsilon = 1e-12);
        assert_relative_eq!(
            curve.discount_factor(10.0).unwrap(),
            (-0.25_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_short_end_flat_extrapolation() {
        let curve = ZeroCurve::new(&[1.0_f64, 2.0], &[0.04, 0.05]).unwrap();
        assert_relative_eq!(curve.zero_rate(0.25).unwrap(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_unsorted_pillars_rejected() {
        assert!(ZeroCurve::new(&[2.0_f64, 1.0], &[0.01, 0.02]).is_err());
        assert!(ZeroCurve::new(&[0.0_f64, 1.0], &[0.01, 0.02]).is_err());
        assert!(ZeroCurve::<f64>::new(&[], &[]).is_err());
    }
}
