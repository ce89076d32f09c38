//! Yield curve trait definition.

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Generic yield curve.
///
/// Times are year fractions from the curve's reference date. Only
/// `discount_factor` is required; rates derive from it.
pub trait YieldCurve<T: Float> {
    /// Discount factor for time `t >= 0`.
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError>;

    /// Continuously compounded zero rate for `t > 0`.
    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        let df = self.discount_factor(t)?;
        Ok(-df.ln() / t)
    }

    /// Continuously compounded forward rate between `t1 < t2`.
    fn forward_rate(&self, t1: T, t2: T) -> Result<T, MarketDataError> {
        let dt = t2 - t1;
        if dt <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: dt.to_f64().unwrap_or(0.0),
            });
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok(-(df2 / df1).ln() / dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct ExpCurve {
        rate: f64,
    }

    impl YieldCurve<f64> for ExpCurve {
        fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
            if t < 0.0 {
                return Err(MarketDataError::InvalidMaturity { t });
            }
            Ok((-self.rate * t).exp())
        }
    }

    #[test]
    fn test_default_zero_rate() {
        let curve = ExpCurve { rate: 0.03 };
        assert_relative_eq!(curve.zero_rate(2.0).unwrap(), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_default_zero_rate_rejects_zero_time() {
        let curve = ExpCurve { rate: 0.03 };
        assert!(matches!(
            curve.zero_rate(0.0),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
    }

    #[test]
    fn test_default_forward_rate() {
        let curve = ExpCurve { rate: 0.03 };
        assert_relative_eq!(curve.forward_rate(1.0, 1.5).unwrap(), 0.03, epsilon = 1e-12);
        assert!(curve.forward_rate(1.5, 1.0).is_err());
    }
}
