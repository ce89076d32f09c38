//! Unilateral CVA.
//!
//! ```text
//! CVA = LGD * sum_i EE(t_i) * (S(t_{i-1}) - S(t_i))
//! ```
//!
//! with `S(t_0) = 1` today and `S(t_i)` the expected survival probability
//! of the counterparty read from the counterparty cube. EE is deflated, so
//! the result is in today's currency units.

use super::{AggregationError, ExposureProfile};
use crate::calculators::PROBABILITY_SLOT;
use crate::cube::NpvCube;
use crate::portfolio::{NettingSetId, Portfolio};
use tracing::debug;

/// CVA of one netting set.
#[derive(Debug, Clone, PartialEq)]
pub struct CvaResult {
    /// Netting set id.
    pub netting_set: String,
    /// Counterparty of the netting set.
    pub counterparty: String,
    /// Loss given default used.
    pub lgd: f64,
    /// CVA, non-negative.
    pub cva: f64,
}

/// Mean survival probability per date of one counterparty, with today's
/// value 1.0 prepended.
pub fn expected_survival(
    counterparties: &NpvCube,
    id: usize,
) -> Result<Vec<f64>, AggregationError> {
    let samples = counterparties.samples();
    let mut survival = Vec::with_capacity(counterparties.num_dates() + 1);
    survival.push(1.0);
    for date in 0..counterparties.num_dates() {
        let mut sum = 0.0;
        for sample in 0..samples {
            sum += counterparties.get(id, date, sample, PROBABILITY_SLOT)?;
        }
        survival.push(sum / samples as f64);
    }
    Ok(survival)
}

/// CVA from an EE profile and survival curve on the same dates (today
/// first).
///
/// # Examples
///
/// ```
/// use pricer_exposure::aggregation::unilateral_cva;
///
/// let ee = [0.0, 100.0, 100.0];
/// let survival = [1.0, 0.99, 0.97];
/// let cva = unilateral_cva(&ee, &survival, 0.6);
/// assert!((cva - 0.6 * (100.0 * 0.01 + 100.0 * 0.02)).abs() < 1e-12);
/// ```
pub fn unilateral_cva(ee: &[f64], survival: &[f64], lgd: f64) -> f64 {
    if ee.len() != survival.len() || ee.len() < 2 {
        return 0.0;
    }
    let cva: f64 = (1..ee.len())
        .map(|i| ee[i] * (survival[i - 1] - survival[i]))
        .sum();
    (lgd * cva).max(0.0)
}

/// CVA of every profiled netting set.
///
/// # Errors
///
/// `UnknownId` if a netting set or its counterparty cannot be found in the
/// portfolio or the counterparty cube.
pub fn cva_by_netting_set(
    portfolio: &Portfolio,
    profiles: &[ExposureProfile],
    counterparties: &NpvCube,
) -> Result<Vec<CvaResult>, AggregationError> {
    profiles
        .iter()
        .map(|profile| {
            let ns = portfolio
                .netting_set(&NettingSetId::new(profile.netting_set.as_str()))
                .ok_or_else(|| AggregationError::UnknownId(profile.netting_set.clone()))?;
            let cp_id = ns.counterparty_id();
            let cp = portfolio
                .counterparty(cp_id)
                .ok_or_else(|| AggregationError::UnknownId(cp_id.to_string()))?;
            let index = counterparties
                .id_index(cp_id.as_str())
                .ok_or_else(|| AggregationError::UnknownId(cp_id.to_string()))?;
            let survival = expected_survival(counterparties, index)?;
            let cva = unilateral_cva(&profile.ee, &survival, cp.lgd());
            debug!(netting_set = %profile.netting_set, counterparty = %cp_id, cva, "CVA");
            Ok(CvaResult {
                netting_set: profile.netting_set.clone(),
                counterparty: cp_id.to_string(),
                lgd: cp.lgd(),
                cva,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::exposure_profiles;
    use crate::calculators::test_support::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_exposure_zero_cva() {
        assert_eq!(unilateral_cva(&[0.0, 0.0, 0.0], &[1.0, 0.9, 0.8], 0.6), 0.0);
        assert_eq!(unilateral_cva(&[1.0], &[1.0, 0.9], 0.6), 0.0);
    }

    #[test]
    fn test_higher_default_higher_cva() {
        let ee = [0.0, 50.0, 50.0];
        let low = unilateral_cva(&ee, &[1.0, 0.99, 0.98], 0.6);
        let high = unilateral_cva(&ee, &[1.0, 0.95, 0.90], 0.6);
        assert!(high > low);
    }

    #[test]
    fn test_cva_by_netting_set() {
        let portfolio = portfolio();
        let dates = vec![ymd(2025, 1, 1), ymd(2026, 1, 1)];
        let mut netted = NpvCube::new(
            today(),
            vec!["NS_A".to_string(), "NS_B".to_string()],
            dates.clone(),
            2,
            1,
        )
        .unwrap();
        let mut cps = NpvCube::new(
            today(),
            vec!["CP_A".to_string(), "CP_B".to_string()],
            dates,
            2,
            2,
        )
        .unwrap();
        for id in 0..2 {
            netted.set_t0(0.0, id, 0).unwrap();
        }
        for s in 0..2 {
            for d in 0..2 {
                netted.set(100.0, 0, d, s, 0).unwrap();
                netted.set(-5.0, 1, d, s, 0).unwrap();
                cps.set(0.98 - 0.02 * d as f64, 0, d, s, 0).unwrap();
                cps.set(1.0, 1, d, s, 0).unwrap();
            }
        }
        let profiles = exposure_profiles(&netted, 0.95).unwrap();
        let cva = cva_by_netting_set(&portfolio, &profiles, &cps).unwrap();
        assert_eq!(cva[0].counterparty, "CP_A");
        assert_relative_eq!(cva[0].cva, 0.6 * (100.0 * 0.02 + 100.0 * 0.02), epsilon = 1e-12);
        assert_eq!(cva[1].cva, 0.0);
    }
}
