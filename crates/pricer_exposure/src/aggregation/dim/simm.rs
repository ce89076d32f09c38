//! DIM from simulated sensitivities.

use super::{missing, DimCalculator, DimError, ImScaling};
use crate::cube::{CubeError, NpvCube};
use crate::date_grid::DateGrid;
use crate::engine::CubeLayout;
use crate::margin::ParametricVar;
use crate::portfolio::Portfolio;
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};
use tracing::{debug, info, warn};

/// Grid date closest to `horizon_days` after today, with the square-root
/// time scaling that maps its spread onto the horizon.
///
/// Dates short of the horizon are skipped. A date exactly on the horizon
/// is used unscaled; otherwise the nearer of the two dates straddling it
/// wins, ties going to the later one. Without any date at or beyond the
/// horizon the first date is used unscaled.
pub fn horizon_date_index(grid: &DateGrid, horizon_days: i64) -> (usize, f64) {
    let today = grid.today();
    let dates = grid.valuation_dates();
    for (i, date) in dates.iter().enumerate() {
        let days = *date - today;
        if days < horizon_days {
            continue;
        }
        if days == horizon_days {
            return (i, 1.0);
        }
        if i > 0 {
            let previous = dates[i - 1] - today;
            if horizon_days - previous < days - horizon_days {
                return (i - 1, (horizon_days as f64 / previous as f64).sqrt());
            }
        }
        return (i, (horizon_days as f64 / days as f64).sqrt());
    }
    (0, 1.0)
}

/// SIMM-style DIM: a parametric VaR of the netted key-rate sensitivities
/// stored in the trade cube.
#[derive(Debug, Clone)]
pub struct DynamicSimmCalculator<'a> {
    grid: &'a DateGrid,
    trades: &'a NpvCube,
    var: ParametricVar,
    first_slot: usize,
    members: Vec<Vec<usize>>,
    netting_sets: Vec<String>,
    current_im: Vec<Option<f64>>,
    scalings: Vec<ImScaling>,
}

impl<'a> DynamicSimmCalculator<'a> {
    /// Creates the calculator over a trade cube produced with `layout`.
    ///
    /// # Errors
    ///
    /// `InvalidSetup` if the layout has no sensitivity slots, their count
    /// differs from the VaR buckets, or the cube does not match the
    /// portfolio and grid.
    pub fn new(
        portfolio: &Portfolio,
        trades: &'a NpvCube,
        layout: &CubeLayout,
        grid: &'a DateGrid,
        var: ParametricVar,
    ) -> Result<Self, DimError> {
        let (first_slot, buckets) = layout
            .sensitivities
            .ok_or_else(|| {
                DimError::InvalidSetup("trade cube carries no sensitivities".to_string())
            })?;
        if buckets != var.buckets() {
            return Err(DimError::InvalidSetup(format!(
                "{} sensitivity slots but {} VaR buckets",
                buckets,
                var.buckets()
            )));
        }
        if trades.depth() < first_slot + buckets {
            return Err(DimError::InvalidSetup(format!(
                "trade cube depth {} below {}",
                trades.depth(),
                first_slot + buckets
            )));
        }
        if trades.dates() != grid.valuation_dates() {
            return Err(DimError::InvalidSetup("trade cube dates differ from the grid".to_string()));
        }
        let same_trades = trades.num_ids() == portfolio.size()
            && portfolio
                .trades()
                .iter()
                .zip(trades.ids())
                .all(|(t, id)| t.id().as_str() == id);
        if !same_trades {
            return Err(DimError::InvalidSetup(
                "trade cube ids differ from portfolio trades".to_string(),
            ));
        }

        let mut calculator = Self {
            grid,
            trades,
            var,
            first_slot,
            members: portfolio.netting_set_members(),
            netting_sets: portfolio.netting_sets().iter().map(|ns| ns.id().to_string()).collect(),
            current_im: portfolio.netting_sets().iter().map(|ns| ns.initial_margin()).collect(),
            scalings: Vec::new(),
        };
        calculator.rescale();
        Ok(calculator)
    }

    /// Same calculator at another VaR quantile.
    pub fn with_quantile(&self, quantile: f64) -> Result<Self, DimError> {
        let mut calculator = Self {
            var: self.var.with_quantile(quantile)?,
            ..self.clone()
        };
        calculator.rescale();
        Ok(calculator)
    }

    /// VaR model in use.
    pub fn var(&self) -> &ParametricVar {
        &self.var
    }

    fn rescale(&mut self) {
        self.scalings = (0..self.netting_sets.len())
            .map(|n| match self.unscaled_t0(n) {
                Ok(t0) => ImScaling::from_t0(self.current_im[n], t0),
                Err(e) => {
                    warn!(
                        netting_set = %self.netting_sets[n],
                        error = %e,
                        "No t0 sensitivities, DIM left unscaled"
                    );
                    ImScaling::Identity
                }
            })
            .collect();
        debug!(scalings = ?self.scalings, "SIMM DIM scalings");
    }

    fn netted(
        &self,
        netting_set: usize,
        read: impl Fn(usize, usize) -> Result<f64, CubeError>,
    ) -> Result<Vec<f64>, CubeError> {
        let mut sum = vec![0.0; self.var.buckets()];
        for &trade in &self.members[netting_set] {
            for (k, s) in sum.iter_mut().enumerate() {
                *s += read(trade, self.first_slot + k)?;
            }
        }
        Ok(sum)
    }

    /// Simulation estimate of the t0 DIM per netting set, from the spread of
    /// netted values at the grid date nearest the VaR holding period.
    ///
    /// The estimate is `N^-1(q) * sd * scaling` where `sd` is the population
    /// standard deviation over samples and `scaling` comes from
    /// [`horizon_date_index`].
    pub fn current_dim(&self, netted: &NpvCube) -> Result<BTreeMap<String, f64>, DimError> {
        let horizon = i64::from(self.var.holding_days());
        let (date, scaling) = horizon_date_index(self.grid, horizon);
        if !(FRAC_1_SQRT_2..=SQRT_2).contains(&scaling) {
            warn!(
                horizon_days = horizon,
                date = %self.grid.valuation_dates()[date],
                scaling,
                "Grid date far from the margin horizon"
            );
        }
        let z = Normal::new(0.0, 1.0)
            .map_err(|e| DimError::InvalidSetup(e.to_string()))?
            .inverse_cdf(self.var.quantile());
        let day = self.grid.valuation_dates()[date];

        let mut out = BTreeMap::new();
        for id in &self.netting_sets {
            let index = netted
                .id_index(id)
                .ok_or_else(|| {
                    DimError::InvalidSetup(format!("netting set {} not in netted cube", id))
                })?;
            let values = (0..netted.samples())
                .map(|s| netted.get(index, date, s, 0))
                .collect::<Result<Vec<f64>, _>>()
                .map_err(missing(id, day))?;
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            out.insert(id.clone(), z * variance.sqrt() * scaling);
        }
        info!(date = %day, scaling, "Current DIM estimated");
        Ok(out)
    }
}

impl DimCalculator for DynamicSimmCalculator<'_> {
    fn name(&self) -> &'static str {
        "DynamicSimm"
    }

    fn grid(&self) -> &DateGrid {
        self.grid
    }

    fn samples(&self) -> usize {
        self.trades.samples()
    }

    fn netting_set_ids(&self) -> &[String] {
        &self.netting_sets
    }

    fn scaling(&self, netting_set: usize) -> ImScaling {
        self.scalings.get(netting_set).copied().unwrap_or(ImScaling::Identity)
    }

    fn unscaled_t0(&self, netting_set: usize) -> Result<f64, DimError> {
        let sensitivities = self
            .netted(netting_set, |trade, slot| self.trades.get_t0(trade, slot))
            .map_err(missing(&self.netting_sets[netting_set], self.grid.today()))?;
        Ok(self.var.margin(&sensitivities)?)
    }

    fn unscaled_dim(
        &self,
        netting_set: usize,
        date: usize,
        sample: usize,
    ) -> Result<f64, DimError> {
        let day = self.grid.valuation_dates()[date];
        let sensitivities = self
            .netted(netting_set, |trade, slot| self.trades.get(trade, date, sample, slot))
            .map_err(missing(&self.netting_sets[netting_set], day))?;
        Ok(self.var.margin(&sensitivities)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn layout() -> CubeLayout {
        CubeLayout {
            npv: 0,
            close_out: None,
            sensitivities: Some((1, 2)),
            trade_depth: 3,
            counterparty_cube: false,
            netting_set_cube: false,
        }
    }

    fn grid() -> DateGrid {
        DateGrid::new(today(), vec![ymd(2024, 1, 8), ymd(2024, 1, 22), ymd(2024, 7, 1)]).unwrap()
    }

    fn trade_cube(portfolio: &Portfolio, grid: &DateGrid, samples: usize) -> NpvCube {
        let ids = portfolio.trades().iter().map(|t| t.id().to_string()).collect();
        let dates = grid.valuation_dates().to_vec();
        let mut cube = NpvCube::new(today(), ids, dates, samples, 3).unwrap();
        for t in 0..portfolio.size() {
            cube.set_t0(0.0, t, 0).unwrap();
            cube.set_t0(10.0 * (t + 1) as f64, t, 1).unwrap();
            cube.set_t0(-5.0, t, 2).unwrap();
            for d in 0..grid.len() {
                for s in 0..samples {
                    cube.set(0.0, t, d, s, 0).unwrap();
                    cube.set((t + d + s) as f64, t, d, s, 1).unwrap();
                    cube.set(2.0 - s as f64, t, d, s, 2).unwrap();
                }
            }
        }
        cube
    }

    #[test]
    fn test_horizon_date_index() {
        let grid = grid();
        assert_eq!(horizon_date_index(&grid, 7), (0, 1.0));
        // 14 days: 7 and 21 straddle equally, the later wins
        let (i, s) = horizon_date_index(&grid, 14);
        assert_eq!(i, 1);
        assert_relative_eq!(s, (14.0f64 / 21.0).sqrt());
        let (i, s) = horizon_date_index(&grid, 10);
        assert_eq!(i, 0);
        assert_relative_eq!(s, (10.0f64 / 7.0).sqrt());
        assert_eq!(horizon_date_index(&grid, 400), (0, 1.0));
    }

    #[test]
    fn test_t0_dim_is_margin_of_netted_sensitivities() {
        let portfolio = portfolio();
        let grid = grid();
        let cube = trade_cube(&portfolio, &grid, 2);
        let var = ParametricVar::uniform(2, 80.0, 0.5, 0.99, 14).unwrap();
        let calc =
            DynamicSimmCalculator::new(&portfolio, &cube, &layout(), &grid, var.clone()).unwrap();
        let current = calc.unscaled_current_dim().unwrap();
        // NS_A holds trades 0 and 1
        assert_relative_eq!(current["NS_A"], var.margin(&[30.0, -10.0]).unwrap(), epsilon = 1e-9);
        assert_relative_eq!(current["NS_B"], var.margin(&[30.0, -5.0]).unwrap(), epsilon = 1e-9);
        assert_relative_eq!(
            calc.unscaled_dim(0, 2, 1).unwrap(),
            var.margin(&[(2 + 1) as f64 + (1 + 2 + 1) as f64, 2.0]).unwrap(),
            epsilon = 1e-9
        );
        assert_eq!(calc.scaling(0), ImScaling::Identity);
    }

    #[test]
    fn test_rejects_layout_without_sensitivities() {
        let portfolio = portfolio();
        let grid = grid();
        let cube = trade_cube(&portfolio, &grid, 1);
        let var = ParametricVar::uniform(2, 80.0, 0.5, 0.99, 14).unwrap();
        let no_sens = CubeLayout {
            sensitivities: None,
            ..layout()
        };
        assert!(matches!(
            DynamicSimmCalculator::new(&portfolio, &cube, &no_sens, &grid, var.clone()),
            Err(DimError::InvalidSetup(_))
        ));
        let three = ParametricVar::uniform(3, 80.0, 0.5, 0.99, 14).unwrap();
        assert!(DynamicSimmCalculator::new(&portfolio, &cube, &layout(), &grid, three).is_err());
    }

    #[test]
    fn test_current_dim_from_netted_spread() {
        let portfolio = portfolio();
        let grid = grid();
        let cube = trade_cube(&portfolio, &grid, 2);
        let var = ParametricVar::uniform(2, 80.0, 0.5, 0.99, 7).unwrap();
        let calc = DynamicSimmCalculator::new(&portfolio, &cube, &layout(), &grid, var).unwrap();
        let ids = vec!["NS_A".to_string(), "NS_B".to_string()];
        let mut netted = NpvCube::new(today(), ids, grid.valuation_dates().to_vec(), 2, 1).unwrap();
        for d in 0..3 {
            netted.set(100.0, 0, d, 0, 0).unwrap();
            netted.set(120.0, 0, d, 1, 0).unwrap();
            netted.set(5.0, 1, d, 0, 0).unwrap();
            netted.set(5.0, 1, d, 1, 0).unwrap();
        }
        let dim = calc.current_dim(&netted).unwrap();
        assert_relative_eq!(dim["NS_A"], 2.326_347_874 * 10.0, epsilon = 1e-6);
        assert_relative_eq!(dim["NS_B"], 0.0);
    }

    proptest! {
        #[test]
        fn test_dim_monotone_in_quantile(q in 0.5f64..0.99, dq in 0.0f64..0.009) {
            let portfolio = portfolio();
            let grid = grid();
            let cube = trade_cube(&portfolio, &grid, 3);
            let var = ParametricVar::uniform(2, 60.0, 0.3, q, 14).unwrap();
            let low = DynamicSimmCalculator::new(&portfolio, &cube, &layout(), &grid, var).unwrap();
            let high = low.with_quantile(q + dq).unwrap();
            let low = low.build().unwrap();
            let high = high.build().unwrap();
            for (id, series) in &low {
                prop_assert!(high[id].t0 >= series.t0);
                for (l, h) in series.expected().iter().zip(high[id].expected()) {
                    prop_assert!(h >= *l);
                }
            }
        }
    }
}
