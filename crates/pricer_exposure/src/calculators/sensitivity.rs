//! Bucketed rate sensitivities.

use super::{CalculatorError, SampleOutputs, T0Outputs, ValuationCalculator};
use crate::portfolio::Trade;
use pricer_models::market::MarketView;
use pricer_simulation::market::{KeyRateBuckets, ShiftedMarket, SimMarket};

/// One basis point.
pub const BASIS_POINT: f64 = 1e-4;

/// Writes deflated 1bp key-rate deltas of each trade into consecutive depth
/// slots starting at `first_index`, one slot per bucket.
///
/// Deltas are taken on default-date steps only; close-out steps are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCalculator {
    buckets: KeyRateBuckets,
    first_index: usize,
    shift: f64,
}

impl SensitivityCalculator {
    /// Bumps of one basis point.
    pub fn new(buckets: KeyRateBuckets, first_index: usize) -> Self {
        Self {
            buckets,
            first_index,
            shift: BASIS_POINT,
        }
    }

    /// Key-rate buckets.
    #[inline]
    pub fn buckets(&self) -> &KeyRateBuckets {
        &self.buckets
    }

    /// First depth slot.
    #[inline]
    pub fn first_index(&self) -> usize {
        self.first_index
    }

    fn deltas(&self, trade: &Trade, market: &dyn SimMarket) -> Result<Vec<f64>, CalculatorError> {
        let base_market = market.as_market_view();
        let base = trade.instrument().npv(base_market)?;
        let numeraire = market.numeraire();
        (0..self.buckets.len())
            .map(|bucket| {
                let shifted = ShiftedMarket::new(base_market, &self.buckets, bucket, self.shift);
                let bumped = trade.instrument().npv(&shifted as &dyn MarketView)?;
                Ok((bumped - base) / numeraire)
            })
            .collect()
    }
}

impl ValuationCalculator for SensitivityCalculator {
    fn name(&self) -> &'static str {
        "Sensitivity"
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
        if is_close_out {
            return Ok(());
        }
        for (bucket, delta) in self.deltas(trade, market)?.into_iter().enumerate() {
            output
                .trades
                .set(delta, trade_index, date_index, self.first_index + bucket)?;
        }
        Ok(())
    }

    fn calculate_t0(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        for (bucket, delta) in self.deltas(trade, market)?.into_iter().enumerate() {
            output
                .trades
                .set_t0(delta, trade_index, self.first_index + bucket)?;
        }
        Ok(())
    }
}
