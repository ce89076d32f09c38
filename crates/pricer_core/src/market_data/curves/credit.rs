//! Credit curve abstractions.
//!
//! This module provides:
//! - [`CreditCurve`]: Hazard rate and survival probability trait
//! - [`FlatHazardRateCurve`]: Constant hazard rate
//! - [`HazardRateCurve`]: Piecewise constant hazard rates between pillars
//! - [`CreditCurveEnum`]: Static dispatch over both

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Generic credit curve.
///
/// `survival_probability(t)` is `exp(-integral of hazard rate over [0, t])`.
pub trait CreditCurve<T: Float> {
    /// Instantaneous hazard rate at `t`.
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError>;

    /// Probability of no default before `t`.
    fn survival_probability(&self, t: T) -> Result<T, MarketDataError>;

    /// Probability of default before `t`.
    fn default_probability(&self, t: T) -> Result<T, MarketDataError> {
        Ok(T::one() - self.survival_probability(t)?)
    }
}

fn check_time<T: Float>(t: T) -> Result<(), MarketDataError> {
    if t < T::zero() {
        return Err(MarketDataError::InvalidMaturity {
            t: t.to_f64().unwrap_or(0.0),
        });
    }
    Ok(())
}

/// Constant hazard rate curve.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
///
/// let curve = FlatHazardRateCurve::new(0.01_f64).unwrap();
/// let surv = curve.survival_probability(5.0).unwrap();
/// assert!((surv - (-0.05_f64).exp()).abs() < 1e-12);
/// assert!(FlatHazardRateCurve::new(-0.01_f64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHazardRateCurve<T: Float> {
    hazard_rate: T,
}

impl<T: Float> FlatHazardRateCurve<T> {
    /// Creates the curve; the hazard rate must be non-negative.
    pub fn new(hazard_rate: T) -> Result<Self, MarketDataError> {
        if hazard_rate < T::zero() {
            return Err(MarketDataError::InvalidParameter {
                reason: format!(
                    "hazard rate must be non-negative, got {}",
                    hazard_rate.to_f64().unwrap_or(0.0)
                ),
            });
        }
        Ok(Self { hazard_rate })
    }

    /// The constant hazard rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.hazard_rate
    }
}

impl<T: Float> CreditCurve<T> for FlatHazardRateCurve<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        Ok(self.hazard_rate)
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        Ok((-self.hazard_rate * t).exp())
    }
}

/// Piecewise constant hazard rate curve.
///
/// `hazard_rates[i]` applies on `(times[i-1], times[i]]` with `times[-1] = 0`;
/// the last rate extends beyond the final pillar.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, HazardRateCurve};
///
/// let curve = HazardRateCurve::new(&[1.0_f64, 3.0], &[0.01, 0.02]).unwrap();
/// let expected = (-(0.01_f64 + 2.0 * 0.02)).exp();
/// assert!((curve.survival_probability(3.0).unwrap() - expected).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HazardRateCurve<T: Float> {
    times: Vec<T>,
    hazard_rates: Vec<T>,
}

impl<T: Float> HazardRateCurve<T> {
    /// Builds the curve from strictly increasing positive pillars.
    pub fn new(times: &[T], hazard_rates: &[T]) -> Result<Self, MarketDataError> {
        if times.is_empty() || times.len() != hazard_rates.len() {
            return Err(MarketDataError::InsufficientData {
                got: hazard_rates.len(),
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
        if let Some(h) = hazard_rates.iter().find(|h| **h < T::zero()) {
            return Err(MarketDataError::InvalidParameter {
                reason: format!(
                    "hazard rate must be non-negative, got {}",
                    h.to_f64().unwrap_or(0.0)
                ),
            });
        }
        Ok(Self {
            times: times.to_vec(),
            hazard_rates: hazard_rates.to_vec(),
        })
    }

    fn integrated_hazard(&self, t: T) -> T {
        let mut integral = T::zero();
        let mut prev = T::zero();
        for (&pillar, &h) in self.times.iter().zip(&self.hazard_rates) {
            if t <= pillar {
                return integral + h * (t - prev);
            }
            integral = integral + h * (pillar - prev);
            prev = pillar;
        }
        let last = self.hazard_rates[self.hazard_rates.len() - 1];
        integral + last * (t - prev)
    }
}

impl<T: Float> CreditCurve<T> for HazardRateCurve<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        let i = self
            .times
            .partition_point(|&x| x < t)
            .min(self.times.len() - 1);
        Ok(self.hazard_rates[i])
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        check_time(t)?;
        Ok((-self.integrated_hazard(t)).exp())
    }
}

/// Credit curve enum used by the simulated market.
#[derive(Debug, Clone, PartialEq)]
pub enum CreditCurveEnum<T: Float> {
    /// Constant hazard rate.
    Flat(FlatHazardRateCurve<T>),
    /// Piecewise constant hazard rates.
    Piecewise(HazardRateCurve<T>),
}

impl<T: Float> CreditCurve<T> for CreditCurveEnum<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        match self {
            CreditCurveEnum::Flat(curve) => curve.hazard_rate(t),
            CreditCurveEnum::Piecewise(curve) => curve.hazard_rate(t),
        }
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        match self {
            CreditCurveEnum::Flat(curve) => curve.survival_probability(t),
            CreditCurveEnum::Piecewise(curve) => curve.survival_probability(t),
        }
    }
}

impl<T: Float> From<FlatHazardRateCurve<T>> for CreditCurveEnum<T> {
    fn from(curve: FlatHazardRateCurve<T>) -> Self {
        CreditCurveEnum::Flat(curve)
    }
}

impl<T: Float> From<HazardRateCurve<T>> for CreditCurveEnum<T> {
    fn from(curve: HazardRateCurve<T>) -> Self {
        CreditCurveEnum::Piecewise(curve)
    }
}
