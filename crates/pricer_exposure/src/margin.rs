//! Parametric initial margin from bucketed sensitivities.
//!
//! The margin of a sensitivity vector `s` (per 1bp bucket shift) is a
//! delta-normal VaR:
//!
//! ```text
//! IM = N^-1(q) * sqrt(holding_days / 365) * sqrt(s' Sigma s)
//! ```
//!
//! where `Sigma` is the annual covariance of bucket rate moves in basis
//! points, built from per-bucket volatilities and a correlation matrix.
//! This is the SIMM-style aggregation step of the dynamic IM calculators;
//! risk weights and concentration thresholds are not modelled.

use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

/// Default VaR quantile.
pub const DEFAULT_QUANTILE: f64 = 0.99;

/// Default holding period in calendar days.
pub const DEFAULT_HOLDING_DAYS: u32 = 14;

/// Parametric VaR parameter errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarginError {
    /// Quantile outside `(0, 1)`.
    #[error("Quantile {0} must lie in (0, 1)")]
    InvalidQuantile(f64),

    /// Zero holding period.
    #[error("Holding period must be positive")]
    InvalidHoldingPeriod,

    /// Volatility or correlation inputs inconsistent.
    #[error("Invalid covariance input: {0}")]
    InvalidCovariance(String),

    /// Sensitivity vector length differs from the bucket count.
    #[error("Expected {expected} sensitivities, got {got}")]
    DimensionMismatch {
        /// Bucket count.
        expected: usize,
        /// Length provided.
        got: usize,
    },
}

/// Delta-normal VaR over key-rate buckets.
///
/// # Examples
///
/// ```
/// use pricer_exposure::margin::ParametricVar;
///
/// // Two perfectly correlated buckets behave like one.
/// let var = ParametricVar::uniform(2, 100.0, 1.0, 0.99, 14).unwrap();
/// let joint = var.margin(&[10.0, 5.0]).unwrap();
/// let single = ParametricVar::uniform(1, 100.0, 1.0, 0.99, 14).unwrap().margin(&[15.0]).unwrap();
/// assert!((joint - single).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricVar {
    quantile: f64,
    holding_days: u32,
    covariance: Vec<Vec<f64>>,
    scale: f64,
}

impl ParametricVar {
    /// Creates the calculator from bucket volatilities (bp per year) and a
    /// correlation matrix.
    pub fn new(
        volatilities: &[f64],
        correlation: &[Vec<f64>],
        quantile: f64,
        holding_days: u32,
    ) -> Result<Self, MarginError> {
        if !(quantile > 0.0 && quantile < 1.0) {
            return Err(MarginError::InvalidQuantile(quantile));
        }
        if holding_days == 0 {
            return Err(MarginError::InvalidHoldingPeriod);
        }
        let n = volatilities.len();
        if n == 0 {
            return Err(MarginError::InvalidCovariance("no buckets".to_string()));
        }
        if volatilities.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(MarginError::InvalidCovariance(
                "volatilities must be finite and non-negative".to_string(),
            ));
        }
        if correlation.len() != n || correlation.iter().any(|row| row.len() != n) {
            return Err(MarginError::InvalidCovariance(format!(
                "correlation must be {}x{}",
                n, n
            )));
        }
        for i in 0..n {
            if (correlation[i][i] - 1.0).abs() > 1e-12 {
                return Err(MarginError::InvalidCovariance(format!(
                    "correlation diagonal at {} is not 1",
                    i
                )));
            }
            for j in 0..n {
                let rho = correlation[i][j];
                if !(-1.0..=1.0).contains(&rho) || (rho - correlation[j][i]).abs() > 1e-12 {
                    return Err(MarginError::InvalidCovariance(format!(
                        "correlation entry ({}, {}) invalid",
                        i, j
                    )));
                }
            }
        }

        let covariance = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| volatilities[i] * volatilities[j] * correlation[i][j])
                    .collect()
            })
            .collect();
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| MarginError::InvalidCovariance(e.to_string()))?;
        let scale = normal.inverse_cdf(quantile) * (f64::from(holding_days) / 365.0).sqrt();

        Ok(Self {
            quantile,
            holding_days,
            covariance,
            scale,
        })
    }

    /// Same volatility for every bucket and constant pairwise correlation.
    pub fn uniform(
        buckets: usize,
        volatility: f64,
        correlation: f64,
        quantile: f64,
        holding_days: u32,
    ) -> Result<Self, MarginError> {
        let vols = vec![volatility; buckets];
        let corr: Vec<Vec<f64>> = (0..buckets)
            .map(|i| {
                (0..buckets)
                    .map(|j| if i == j { 1.0 } else { correlation })
                    .collect()
            })
            .collect();
        Self::new(&vols, &corr, quantile, holding_days)
    }

    /// VaR quantile.
    #[inline]
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// Holding period in calendar days.
    #[inline]
    pub fn holding_days(&self) -> u32 {
        self.holding_days
    }

    /// Number of buckets.
    #[inline]
    pub fn buckets(&self) -> usize {
        self.covariance.len()
    }

    /// Same covariance at another quantile.
    pub fn with_quantile(&self, quantile: f64) -> Result<Self, MarginError> {
        if !(quantile > 0.0 && quantile < 1.0) {
            return Err(MarginError::InvalidQuantile(quantile));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| MarginError::InvalidCovariance(e.to_string()))?;
        Ok(Self {
            quantile,
            scale: normal.inverse_cdf(quantile) * (f64::from(self.holding_days) / 365.0).sqrt(),
            ..self.clone()
        })
    }

    /// Margin of a sensitivity vector.
    pub fn margin(&self, sensitivities: &[f64]) -> Result<f64, MarginError> {
        let n = self.covariance.len();
        if sensitivities.len() != n {
            return Err(MarginError::DimensionMismatch {
                expected: n,
                got: sensitivities.len(),
            });
        }
        let variance: f64 = self
            .covariance
            .iter()
            .zip(sensitivities)
            .map(|(row, si)| si * row.iter().zip(sensitivities).map(|(c, sj)| c * sj).sum::<f64>())
            .sum();
        Ok(self.scale * variance.max(0.0).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_single_bucket_closed_form() {
        let var = ParametricVar::uniform(1, 80.0, 0.0, 0.99, 365).unwrap();
        assert_relative_eq!(var.margin(&[-2.0]).unwrap(), 2.326_347_874 * 160.0, epsilon = 1e-6);
    }

    #[test]
    fn test_uncorrelated_buckets_add_in_quadrature() {
        let var = ParametricVar::uniform(2, 100.0, 0.0, 0.99, 10).unwrap();
        let a = var.margin(&[3.0, 0.0]).unwrap();
        let b = var.margin(&[0.0, 4.0]).unwrap();
        assert_relative_eq!(
            var.margin(&[3.0, 4.0]).unwrap(),
            (a * a + b * b).sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            ParametricVar::uniform(1, 1.0, 0.0, 1.0, 14),
            Err(MarginError::InvalidQuantile(1.0))
        );
        assert_eq!(
            ParametricVar::uniform(1, 1.0, 0.0, 0.99, 0),
            Err(MarginError::InvalidHoldingPeriod)
        );
        assert!(
            ParametricVar::new(&[1.0, 1.0], &[vec![1.0, 0.5], vec![0.4, 1.0]], 0.99, 14).is_err()
        );
        let var = ParametricVar::uniform(2, 1.0, 0.0, 0.99, 14).unwrap();
        assert_eq!(
            var.margin(&[1.0]),
            Err(MarginError::DimensionMismatch { expected: 2, got: 1 })
        );
    }

    proptest! {
        #[test]
        fn test_margin_monotone_in_quantile(
            q1 in 0.5f64..0.999,
            dq in 0.0f64..0.0009,
            s in proptest::collection::vec(-50.0f64..50.0, 3),
        ) {
            let low = ParametricVar::uniform(3, 90.0, 0.6, q1, 14).unwrap();
            let high = low.with_quantile(q1 + dq).unwrap();
            prop_assert!(high.margin(&s).unwrap() >= low.margin(&s).unwrap());
        }
    }
}
