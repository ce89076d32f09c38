//! NPV calculator.

use super::{deflated_npv, CalculatorError, SampleOutputs, T0Outputs, ValuationCalculator};
use crate::portfolio::Trade;
use pricer_simulation::market::SimMarket;

/// Writes the deflated NPV of each trade.
///
/// On a default-date step the cell at `index` gets `NPV / N`. On a close-out
/// step the cell at `close_out_index` gets the deflated NPV re-inflated by
/// the close-out numeraire; without a close-out slot close-out steps are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct NpvCalculator {
    index: usize,
    close_out_index: Option<usize>,
}

impl NpvCalculator {
    /// Writes default-date values only.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            close_out_index: None,
        }
    }

    /// Also writes close-out values into `close_out_index`.
    pub fn with_close_out(index: usize, close_out_index: usize) -> Self {
        Self {
            index,
            close_out_index: Some(close_out_index),
        }
    }

    /// Depth slot of default-date values.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Depth slot of close-out values.
    #[inline]
    pub fn close_out_index(&self) -> Option<usize> {
        self.close_out_index
    }
}

impl ValuationCalculator for NpvCalculator {
    fn name(&self) -> &'static str {
        "Npv"
    }

    fn calculate(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut SampleOutputs<'_>,
        date_index: usize,
        is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        let slot = match (is_close_out, self.close_out_index) {
            (false, _) => self.index,
            (true, Some(slot)) => slot,
            (true, None) => return Ok(()),
        };
        let npv = deflated_npv(trade, market)?;
        let value = if is_close_out { npv * market.numeraire() } else { npv };
        output.trades.set(value, trade_index, date_index, slot)?;
        Ok(())
    }

    fn calculate_t0(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        let npv = deflated_npv(trade, market)?;
        output.trades.set_t0(npv, trade_index, self.index)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use crate::cube::NpvCube;
    use approx::assert_relative_eq;
    use pricer_models::market::MarketView;
    use pricer_simulation::scenario::Scenario;

    fn cube(portfolio: &crate::portfolio::Portfolio, depth: usize) -> NpvCube {
        let ids = portfolio.trades().iter().map(|t| t.id().to_string()).collect();
        NpvCube::new(today(), ids, vec![ymd(2025, 1, 1)], 1, depth).unwrap()
    }

    #[test]
    fn test_t0_npv_matches_instrument() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let mut cube = cube(&portfolio, 1);
        let mut calc = NpvCalculator::new(0);
        let mut out = T0Outputs {
            trades: &mut cube,
            counterparties: None,
            netting_sets: None,
        };
        let bond = &portfolio.trades()[1];
        calc.calculate_t0(bond, 1, &market, &mut out).unwrap();
        assert_relative_eq!(
            cube.get_t0(1, 0).unwrap(),
            100.0 * (-0.03_f64 * 731.0 / 365.0).exp(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_default_and_close_out_slots() {
        let portfolio = portfolio();
        let mut market = market(&portfolio, 0.01);
        let mut cube = cube(&portfolio, 2);
        let mut calc = NpvCalculator::with_close_out(0, 1);
        let bond = &portfolio.trades()[1];

        let date = ymd(2025, 1, 1);
        let t = 366.0 / 365.0;
        market.update(&Scenario { date, time: t, state: 0.004 }, true).unwrap();
        let raw_default = bond.instrument().npv(&market).unwrap();
        let numeraire_default = market.numeraire();
        {
            let mut slices = cube.sample_slices_mut();
            let mut out = SampleOutputs {
                trades: slices.remove(0),
                counterparties: None,
                netting_sets: None,
            };
            calc.calculate(bond, 1, &market, &mut out, 0, false).unwrap();
        }
        assert_relative_eq!(
            cube.get(1, 0, 0, 0).unwrap(),
            raw_default / numeraire_default,
            epsilon = 1e-12
        );

        let close = ymd(2025, 1, 15);
        market
            .update(&Scenario { date: close, time: 380.0 / 365.0, state: 0.006 }, true)
            .unwrap();
        let raw_close = bond.instrument().npv(&market).unwrap();
        {
            let mut slices = cube.sample_slices_mut();
            let mut out = SampleOutputs {
                trades: slices.remove(0),
                counterparties: None,
                netting_sets: None,
            };
            calc.calculate(bond, 1, &market, &mut out, 0, true).unwrap();
        }
        assert_relative_eq!(cube.get(1, 0, 0, 1).unwrap(), raw_close, epsilon = 1e-9);
        assert_eq!(market.asof(), close);
    }

    #[test]
    fn test_close_out_ignored_without_slot() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let mut cube = cube(&portfolio, 1);
        let mut calc = NpvCalculator::new(0);
        let mut slices = cube.sample_slices_mut();
        let mut out = SampleOutputs {
            trades: slices.remove(0),
            counterparties: None,
            netting_sets: None,
        };
        calc.calculate(&portfolio.trades()[0], 0, &market, &mut out, 0, true).unwrap();
        assert!(out.trades.get(0, 0, 0).is_err());
    }
}
