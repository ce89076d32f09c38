//! One-factor linear Gauss-Markov (LGM) model.
//!
//! The LGM model is the Hull-White model written in a parametrisation where
//! the state variable is a driftless Gaussian martingale under the model
//! numeraire:
//!
//! ```text
//! dx(t)   = alpha dW(t),              x(0) = 0
//! zeta(t) = alpha^2 t                 (variance of x(t))
//! H(t)    = (1 - exp(-kappa t)) / kappa
//!
//! N(t, x)    = exp(H(t) x + H(t)^2 zeta(t) / 2) / P(0, t)
//! P(t, T, x) = P(0, T) / P(0, t)
//!              * exp(-(H(T) - H(t)) x - (H(T)^2 - H(t)^2) zeta(t) / 2)
//! ```
//!
//! With `alpha = 0` the model collapses onto the initial curve, which is
//! what deterministic exposure tests rely on.
//!
//! ## Usage
//!
//! ```
//! use pricer_models::models::LgmModel;
//! use pricer_core::market_data::curves::CurveEnum;
//!
//! let model = LgmModel::new(0.01, 0.02, CurveEnum::flat(0.03)).unwrap();
//!
//! // Deflated bond prices are martingales: at x = 0 and alpha > 0 the
//! // bond is close to, but not exactly, the forward discount factor.
//! let p = model.discount_bond(1.0, 5.0, 0.0).unwrap();
//! assert!((p - (-0.12_f64).exp()).abs() < 1e-2);
//! ```

use super::error::ModelError;
use pricer_core::market_data::curves::{CurveEnum, YieldCurve};
use pricer_core::market_data::MarketDataError;

/// LGM model with constant volatility and mean reversion.
#[derive(Debug, Clone, PartialEq)]
pub struct LgmModel {
    mean_reversion: f64,
    volatility: f64,
    initial_curve: CurveEnum<f64>,
}

impl LgmModel {
    /// Creates the model.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite parameters.
    pub fn new(
        mean_reversion: f64,
        volatility: f64,
        initial_curve: CurveEnum<f64>,
    ) -> Result<Self, ModelError> {
        if !(mean_reversion.is_finite() && mean_reversion >= 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "mean_reversion",
                value: mean_reversion,
                reason: "must be finite and non-negative",
            });
        }
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "volatility",
                value: volatility,
                reason: "must be finite and non-negative",
            });
        }
        Ok(Self {
            mean_reversion,
            volatility,
            initial_curve,
        })
    }

    /// Mean reversion speed `kappa`.
    #[inline]
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// State volatility `alpha`.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Initial discount curve.
    #[inline]
    pub fn initial_curve(&self) -> &CurveEnum<f64> {
        &self.initial_curve
    }

    /// `H(t)`; equals `t` in the limit of no mean reversion.
    pub fn h(&self, t: f64) -> f64 {
        let kappa = self.mean_reversion;
        if kappa.abs() < 1e-10 {
            t
        } else {
            (1.0 - (-kappa * t).exp()) / kappa
        }
    }

    /// Variance of the state at `t`.
    #[inline]
    pub fn zeta(&self, t: f64) -> f64 {
        self.volatility * self.volatility * t
    }

    /// Standard deviation of the state increment over `[t0, t1]`.
    pub fn increment_std_dev(&self, t0: f64, t1: f64) -> f64 {
        (self.zeta(t1) - self.zeta(t0)).max(0.0).sqrt()
    }

    /// Numeraire at time `t` in state `x`.
    pub fn numeraire(&self, t: f64, x: f64) -> Result<f64, MarketDataError> {
        let h = self.h(t);
        let p0t = self.initial_curve.discount_factor(t)?;
        Ok((h * x + 0.5 * h * h * self.zeta(t)).exp() / p0t)
    }

    /// Zero bond price at `t` for maturity `maturity >= t` in state `x`.
    pub fn discount_bond(&self, t: f64, maturity: f64, x: f64) -> Result<f64, MarketDataError> {
        if maturity < t {
            return Err(MarketDataError::InvalidMaturity { t: maturity - t });
        }
        let p0t = self.initial_curve.discount_factor(t)?;
        let p0_big_t = self.initial_curve.discount_factor(maturity)?;
        let ht = self.h(t);
        let h_big_t = self.h(maturity);
        let exponent = -(h_big_t - ht) * x - 0.5 * (h_big_t * h_big_t - ht * ht) * self.zeta(t);
        Ok(p0_big_t / p0t * exponent.exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_volatility_reproduces_initial_curve() {
        let model = LgmModel::new(0.05, 0.0, CurveEnum::flat(0.02)).unwrap();
        assert_relative_eq!(model.numeraire(2.0, 0.0).unwrap(), (0.04_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(
            model.discount_bond(2.0, 5.0, 0.0).unwrap(),
            (-0.06_f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bond_at_maturity_is_one() {
        let model = LgmModel::new(0.03, 0.01, CurveEnum::flat(0.02)).unwrap();
        assert_relative_eq!(model.discount_bond(3.0, 3.0, 0.7).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_h_without_mean_reversion() {
        let model = LgmModel::new(0.0, 0.01, CurveEnum::flat(0.02)).unwrap();
        assert_eq!(model.h(4.0), 4.0);
    }

    #[test]
    fn test_deflated_bond_expectation_matches_initial_curve() {
        // E[P(t,T)/N(t)] = P(0,T): integrate over the Gaussian state with a
        // simple quadrature on a fine grid.
        let model = LgmModel::new(0.03, 0.01, CurveEnum::flat(0.025)).unwrap();
        let (t, big_t) = (2.0, 7.0);
        let sd = model.zeta(t).sqrt();
        let n = 4001;
        let width = 10.0 * sd;
        let dx = 2.0 * width / (n - 1) as f64;
        let mut expectation = 0.0;
        for i in 0..n {
            let x = -width + i as f64 * dx;
            let density = (-0.5 * x * x / (sd * sd)).exp() / (
                sd * (2.0 * std::f64::consts::PI).sqrt()
            );
            let deflated = model.discount_bond(
                t,
                big_t,
                x,
            )
            .unwrap() / model.numeraire(t, x).unwrap();
            expectation += deflated * density * dx;
        }
        assert_relative_eq!(expectation, (-0.025_f64 * 7.0).exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_negative_volatility_rejected() {
        assert!(matches!(
            LgmModel::new(0.01, -0.01, CurveEnum::flat(0.02)),
            Err(ModelError::InvalidParameter { name: "volatility", .. })
        ));
    }
}
