//! Counterparty survival probabilities.

use super::{CalculatorError, SampleOutputs, T0Outputs, ValuationCalculator};
use crate::portfolio::{Portfolio, Trade};
use pricer_core::types::Date;
use pricer_simulation::market::SimMarket;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Depth slot of the survival probability.
pub const PROBABILITY_SLOT: usize = 0;

/// Depth slot of the fallback marker: 1.0 when the probability is a fallback.
pub const FALLBACK_SLOT: usize = 1;

/// Ids of the counterparty cube: every counterparty, then the own party.
pub fn counterparty_cube_ids(portfolio: &Portfolio) -> Vec<String> {
    portfolio
        .counterparties()
        .iter()
        .chain(portfolio.own_party())
        .map(|c| c.id().to_string())
        .collect()
}

/// Result of one survival probability lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum SurvivalOutcome {
    /// Probability read from the default curve.
    Computed(f64),
    /// Curve lookup failed; the probability defaults to 1.
    Fallback {
        /// Why the lookup failed.
        reason: String,
    },
}

impl SurvivalOutcome {
    /// The probability to store.
    pub fn probability(&self) -> f64 {
        match self {
            SurvivalOutcome::Computed(p) => *p,
            SurvivalOutcome::Fallback { .. } => 1.0,
        }
    }

    /// Whether this is a fallback value.
    pub fn is_fallback(&self) -> bool {
        matches!(self, SurvivalOutcome::Fallback { .. })
    }
}

/// Writes the survival probability of every counterparty to the market
/// date into the counterparty cube.
///
/// A failed curve lookup writes probability 1.0 and sets the fallback
/// marker slot. Fallbacks are counted across all worker copies of the
/// calculator; the warning is logged once per counterparty and worker.
#[derive(Debug, Clone, Default)]
pub struct SurvivalProbabilityCalculator {
    curves: Vec<(String, String)>,
    fallbacks: Arc<AtomicUsize>,
    warned: BTreeSet<usize>,
}

impl SurvivalProbabilityCalculator {
    /// Creates the calculator; curves are resolved in `init`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fallback values written so far, over all copies.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Shared fallback counter.
    pub fn fallback_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fallbacks)
    }

    /// Survival probability of one counterparty to `date`.
    pub fn survival(market: &dyn SimMarket, curve: &str, date: Date) -> SurvivalOutcome {
        match market.survival_probability(curve, date) {
            Ok(p) => SurvivalOutcome::Computed(p),
            Err(e) => SurvivalOutcome::Fallback {
                reason: e.to_string(),
            },
        }
    }

    fn outcomes(&mut self, market: &dyn SimMarket) -> Vec<SurvivalOutcome> {
        let date = market.asof();
        let mut outcomes = Vec::with_capacity(self.curves.len());
        for (i, (counterparty, curve)) in self.curves.iter().enumerate() {
            let outcome = Self::survival(market, curve, date);
            if let SurvivalOutcome::Fallback { reason } = &outcome {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                if self.warned.insert(i) {
                    warn!(
                        counterparty = %counterparty,
                        curve = %curve,
                        %reason,
                        "Survival probability set to 1.0"
                    );
                } else {
                    debug!(counterparty = %counterparty, %date, "Survival probability fallback");
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl ValuationCalculator for SurvivalProbabilityCalculator {
    fn name(&self) -> &'static str {
        "SurvivalProbability"
    }

    fn init(
        &mut self,
        portfolio: &Portfolio,
        _market: &dyn SimMarket,
    ) -> Result<(), CalculatorError> {
        self.curves = portfolio
            .counterparties()
            .iter()
            .chain(portfolio.own_party())
            .map(|c| (c.id().to_string(), c.default_curve().to_string()))
            .collect();
        Ok(())
    }

    fn calculate(
        &mut self,
        _trade: &Trade,
        _trade_index: usize,
        _market: &dyn SimMarket,
        _output: &mut SampleOutputs<'_>,
        _date_index: usize,
        _is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        Ok(())
    }

    fn calculate_t0(
        &mut self,
        _trade: &Trade,
        _trade_index: usize,
        _market: &dyn SimMarket,
        _output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        Ok(())
    }

    fn calculate_aggregate(
        &mut self,
        _portfolio: &Portfolio,
        market: &dyn SimMarket,
        output: &mut SampleOutputs<'_>,
        date_index: usize,
        is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        if is_close_out {
            return Ok(());
        }
        let outcomes = self.outcomes(market);
        let cube = output
            .counterparties
            .as_mut()
            .ok_or(CalculatorError::MissingOutput {
                calculator: "SurvivalProbability",
                cube: "counterparty",
            })?;
        for (i, outcome) in outcomes.iter().enumerate() {
            cube.set(outcome.probability(), i, date_index, PROBABILITY_SLOT)?;
            cube.set(f64::from(u8::from(outcome.is_fallback())), i, date_index, FALLBACK_SLOT)?;
        }
        Ok(())
    }

    fn calculate_aggregate_t0(
        &mut self,
        _portfolio: &Portfolio,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        let outcomes = self.outcomes(market);
        let cube = output
            .counterparties
            .as_deref_mut()
            .ok_or(CalculatorError::MissingOutput {
                calculator: "SurvivalProbability",
                cube: "counterparty",
            })?;
        for (i, outcome) in outcomes.iter().enumerate() {
            cube.set_t0(outcome.probability(), i, PROBABILITY_SLOT)?;
            cube.set_t0(f64::from(u8::from(outcome.is_fallback())), i, FALLBACK_SLOT)?;
        }
        Ok(())
    }
}
