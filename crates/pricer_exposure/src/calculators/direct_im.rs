//! Netting-set initial margin from netted trade sensitivities.

use super::{CalculatorError, SampleOutputs, T0Outputs, ValuationCalculator};
use crate::margin::ParametricVar;
use crate::portfolio::{Portfolio, Trade};
use pricer_simulation::market::SimMarket;

/// Writes the parametric VaR margin of every netting set into depth 0 of
/// the netting-set cube.
///
/// Reads the bucket sensitivities a [`SensitivityCalculator`] wrote on the
/// same step, so it must run after it.
///
/// [`SensitivityCalculator`]: super::SensitivityCalculator
#[derive(Debug, Clone)]
pub struct DirectImCalculator {
    var: ParametricVar,
    sensitivity_index: usize,
    members: Vec<Vec<usize>>,
}

impl DirectImCalculator {
    /// `sensitivity_index` is the first trade-cube slot holding deltas.
    pub fn new(var: ParametricVar, sensitivity_index: usize) -> Self {
        Self {
            var,
            sensitivity_index,
            members: Vec::new(),
        }
    }

    /// The margin model.
    #[inline]
    pub fn var(&self) -> &ParametricVar {
        &self.var
    }

    fn margins<F>(&self, mut delta: F) -> Result<Vec<f64>, CalculatorError>
    where
        F: FnMut(usize, usize) -> Result<f64, CalculatorError>,
    {
        let buckets = self.var.buckets();
        self.members
            .iter()
            .map(|trades| {
                let mut netted = vec![0.0; buckets];
                for &trade in trades {
                    for (bucket, total) in netted.iter_mut().enumerate() {
                        *total += delta(trade, self.sensitivity_index + bucket)?;
                    }
                }
                Ok(self.var.margin(&netted)?)
            })
            .collect()
    }
}

impl ValuationCalculator for DirectImCalculator {
    fn name(&self) -> &'static str {
        "DirectIm"
    }

    fn init(
        &mut self,
        portfolio: &Portfolio,
        _market: &dyn SimMarket,
    ) -> Result<(), CalculatorError> {
        if self.var.buckets() == 0 {
            return Err(CalculatorError::Configuration {
                calculator: "DirectIm",
                reason: "margin model has no buckets".to_string(),
            });
        }
        self.members = portfolio.netting_set_members();
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
        _market: &dyn SimMarket,
        output: &mut SampleOutputs<'_>,
        date_index: usize,
        is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        if is_close_out {
            return Ok(());
        }
        let trades = &output.trades;
        let margins = self.margins(|trade, slot| Ok(trades.get(trade, date_index, slot)?))?;
        let cube = output
            .netting_sets
            .as_mut()
            .ok_or(CalculatorError::MissingOutput {
                calculator: "DirectIm",
                cube: "netting set",
            })?;
        for (i, im) in margins.into_iter().enumerate() {
            cube.set(im, i, date_index, 0)?;
        }
        Ok(())
    }

    fn calculate_aggregate_t0(
        &mut self,
        _portfolio: &Portfolio,
        _market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        let trades = &*output.trades;
        let margins = self.margins(|trade, slot| Ok(trades.get_t0(trade, slot)?))?;
        let cube = output
            .netting_sets
            .as_deref_mut()
            .ok_or(CalculatorError::MissingOutput {
                calculator: "DirectIm",
                cube: "netting set",
            })?;
        for (i, im) in margins.into_iter().enumerate() {
            cube.set_t0(im, i, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use crate::calculators::SensitivityCalculator;
    use crate::cube::NpvCube;
    use approx::assert_relative_eq;
    use pricer_simulation::market::KeyRateBuckets;

    #[test]
    fn test_t0_margin_nets_member_sensitivities() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let ids = portfolio.trades().iter().map(|t| t.id().to_string()).collect();
        let dates = vec![ymd(2025, 1, 1)];
        let mut trades = NpvCube::new(today(), ids, dates.clone(), 1, 3).unwrap();
        let ns_ids = portfolio.netting_sets().iter().map(|n| n.id().to_string()).collect();
        let mut netting = NpvCube::new(today(), ns_ids, dates, 1, 1).unwrap();

        let buckets = KeyRateBuckets::new(vec![2.0, 5.0]).unwrap();
        let var = ParametricVar::uniform(2, 100.0, 0.5, 0.99, 14).unwrap();
        let mut sens = SensitivityCalculator::new(buckets, 1);
        let mut im = DirectImCalculator::new(var.clone(), 1);
        im.init(&portfolio, &market).unwrap();

        let mut out = T0Outputs {
            trades: &mut trades,
            counterparties: None,
            netting_sets: Some(&mut netting),
        };
        for (i, trade) in portfolio.trades().iter().enumerate() {
            sens.calculate_t0(trade, i, &market, &mut out).unwrap();
        }
        im.calculate_aggregate_t0(&portfolio, &market, &mut out).unwrap();

        let ns_a: Vec<f64> = (1..3)
            .map(|slot| trades.get_t0(0, slot).unwrap() + trades.get_t0(1, slot).unwrap())
            .collect();
        let ns_b: Vec<f64> = (1..3).map(|slot| trades.get_t0(2, slot).unwrap()).collect();
        assert_relative_eq!(
            netting.get_t0(0, 0).unwrap(),
            var.margin(&ns_a).unwrap(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            netting.get_t0(1, 0).unwrap(),
            var.margin(&ns_b).unwrap(),
            epsilon = 1e-9
        );
        assert!(netting.get_t0(0, 0).unwrap() > 0.0);
    }

    #[test]
    fn test_unwritten_sensitivities_are_an_error() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let ids = portfolio.trades().iter().map(|t| t.id().to_string()).collect();
        let dates = vec![ymd(2025, 1, 1)];
        let mut trades = NpvCube::new(today(), ids, dates.clone(), 1, 2).unwrap();
        let ns_ids = portfolio.netting_sets().iter().map(|n| n.id().to_string()).collect();
        let mut netting = NpvCube::new(today(), ns_ids, dates, 1, 1).unwrap();
        let mut im = DirectImCalculator::new(
            ParametricVar::uniform(1, 100.0, 0.0, 0.99, 14).unwrap(),
            1,
        );
        im.init(&portfolio, &market).unwrap();
        let mut out = T0Outputs {
            trades: &mut trades,
            counterparties: None,
            netting_sets: Some(&mut netting),
        };
        assert!(matches!(
            im.calculate_aggregate_t0(&portfolio, &market, &mut out),
            Err(CalculatorError::Cube(_))
        ));
    }
}
