//! Margin period of risk calculator.

use super::npv::NpvCalculator;
use super::{deflated_npv, CalculatorError, SampleOutputs, T0Outputs, ValuationCalculator};
use crate::portfolio::Trade;
use pricer_simulation::market::SimMarket;

/// Default-date values through an inner [`NpvCalculator`]; close-out values
/// are the inner deflated NPV times the close-out numeraire, written into
/// `close_out_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct MporCalculator {
    inner: NpvCalculator,
    close_out_index: usize,
}

impl MporCalculator {
    /// Default-date values at `index`, close-out values at `close_out_index`.
    pub fn new(index: usize, close_out_index: usize) -> Self {
        Self {
            inner: NpvCalculator::new(index),
            close_out_index,
        }
    }

    /// Depth slot of close-out values.
    #[inline]
    pub fn close_out_index(&self) -> usize {
        self.close_out_index
    }
}

impl ValuationCalculator for MporCalculator {
    fn name(&self) -> &'static str {
        "Mpor"
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
        if !is_close_out {
            return self
                .inner
                .calculate(trade, trade_index, market, output, date_index, false);
        }
        let value = deflated_npv(trade, market)? * market.numeraire();
        output
            .trades
            .set(value, trade_index, date_index, self.close_out_index)?;
        Ok(())
    }

    fn calculate_t0(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        self.inner.calculate_t0(trade, trade_index, market, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use crate::cube::NpvCube;
    use approx::assert_relative_eq;
    use pricer_simulation::scenario::Scenario;

    #[test]
    fn test_sticky_close_out_uses_close_out_state() {
        let portfolio = portfolio();
        let mut market = market(&portfolio, 0.01);
        let ids = portfolio.trades().iter().map(|t| t.id().to_string()).collect();
        let mut cube = NpvCube::new(today(), ids, vec![ymd(2025, 1, 1)], 1, 2).unwrap();
        let mut calc = MporCalculator::new(0, 1);
        let swap = &portfolio.trades()[0];

        market
            .update(&Scenario { date: ymd(2025, 1, 1), time: 366.0 / 365.0, state: 0.01 }, true)
            .unwrap();
        let mut slices = cube.sample_slices_mut();
        let mut out = SampleOutputs {
            trades: slices.remove(0),
            counterparties: None,
            netting_sets: None,
        };
        calc.calculate(swap, 0, &market, &mut out, 0, false).unwrap();
        let default = out.trades.get(0, 0, 0).unwrap();

        // Sticky: the valuation date stays, the state moves on.
        market
            .update(&Scenario { date: ymd(2025, 1, 15), time: 380.0 / 365.0, state: 0.02 }, false)
            .unwrap();
        let expected = swap.instrument().npv(market.as_market_view()).unwrap();
        calc.calculate(swap, 0, &market, &mut out, 0, true).unwrap();
        let close_out = out.trades.get(0, 0, 1).unwrap();

        assert_relative_eq!(close_out, expected, epsilon = 1e-8);
        assert!((close_out - default).abs() > 0.0);
    }
}
