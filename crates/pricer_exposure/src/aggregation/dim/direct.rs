//! DIM read from a precomputed IM cube.

use super::{missing, DimCalculator, DimError, ImScaling};
use crate::cube::NpvCube;
use crate::date_grid::DateGrid;
use crate::portfolio::Portfolio;
use tracing::{info, warn};

/// DIM taken directly from the netting-set IM cube filled during the
/// simulation.
#[derive(Debug)]
pub struct DirectDimCalculator<'a> {
    grid: &'a DateGrid,
    im_cube: &'a NpvCube,
    netting_sets: Vec<String>,
    cube_index: Vec<usize>,
    scalings: Vec<ImScaling>,
}

impl<'a> DirectDimCalculator<'a> {
    /// Creates the calculator.
    ///
    /// The scaling of a netting set is `initial_margin / t0 cube value`
    /// when the netting set has an initial margin; a missing t0 cell leaves
    /// the scaling at identity.
    ///
    /// # Errors
    ///
    /// `InvalidSetup` if a netting set is missing from the cube or the cube
    /// dates differ from the grid.
    pub fn new(
        portfolio: &Portfolio,
        grid: &'a DateGrid,
        im_cube: &'a NpvCube,
    ) -> Result<Self, DimError> {
        if im_cube.dates() != grid.valuation_dates() {
            return Err(DimError::InvalidSetup("IM cube dates differ from the grid".to_string()));
        }
        let mut netting_sets = Vec::new();
        let mut cube_index = Vec::new();
        let mut scalings = Vec::new();
        for ns in portfolio.netting_sets() {
            let id = ns.id().to_string();
            let index = im_cube
                .id_index(&id)
                .ok_or_else(|| {
                    DimError::InvalidSetup(format!("netting set {} not in IM cube", id))
                })?;
            let scaling = match im_cube.get_t0(index, 0) {
                Ok(t0) => ImScaling::from_t0(ns.initial_margin(), t0),
                Err(e) => {
                    warn!(netting_set = %id, error = %e, "No t0 IM, DIM left unscaled");
                    ImScaling::Identity
                }
            };
            info!(netting_set = %id, ?scaling, "Direct DIM scaling");
            netting_sets.push(id);
            cube_index.push(index);
            scalings.push(scaling);
        }
        Ok(Self {
            grid,
            im_cube,
            netting_sets,
            cube_index,
            scalings,
        })
    }
}

impl DimCalculator for DirectDimCalculator<'_> {
    fn name(&self) -> &'static str {
        "DirectDim"
    }

    fn grid(&self) -> &DateGrid {
        self.grid
    }

    fn samples(&self) -> usize {
        self.im_cube.samples()
    }

    fn netting_set_ids(&self) -> &[String] {
        &self.netting_sets
    }

    fn scaling(&self, netting_set: usize) -> ImScaling {
        self.scalings[netting_set]
    }

    fn unscaled_t0(&self, netting_set: usize) -> Result<f64, DimError> {
        self.im_cube
            .get_t0(self.cube_index[netting_set], 0)
            .map_err(missing(&self.netting_sets[netting_set], self.grid.today()))
    }

    fn unscaled_dim(
        &self,
        netting_set: usize,
        date: usize,
        sample: usize,
    ) -> Result<f64, DimError> {
        let day = self.grid.valuation_dates()[date];
        self.im_cube
            .get(self.cube_index[netting_set], date, sample, 0)
            .map_err(missing(&self.netting_sets[netting_set], day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use crate::portfolio::{
        Counterparty, CounterpartyId, NettingSet, NettingSetId, PortfolioBuilder,
    };
    use crate::report::{InMemoryReport, ReportValue};
    use approx::assert_relative_eq;

    fn fixture(initial_margin: Option<f64>) -> (Portfolio, DateGrid, NpvCube) {
        let cp = CounterpartyId::new("CP_A");
        let mut ns = NettingSet::new(NettingSetId::new("NS_A"), cp.clone());
        if let Some(im) = initial_margin {
            ns = ns.with_initial_margin(im);
        }
        let portfolio = PortfolioBuilder::new()
            .add_counterparty(Counterparty::new(cp, "CURVE_A", 0.6).unwrap())
            .add_netting_set(ns)
            .add_trade(bond_trade("BOND", "NS_A", "CP_A"))
            .build()
            .unwrap();
        let grid = DateGrid::new(today(), vec![ymd(2024, 7, 1), ymd(2025, 1, 1)]).unwrap();
        let mut cube = NpvCube::new(
            today(),
            vec!["NS_A".to_string()],
            grid.valuation_dates().to_vec(),
            3,
            1,
        )
        .unwrap();
        cube.set_t0(200.0, 0, 0).unwrap();
        for d in 0..2 {
            for s in 0..3 {
                cube.set(100.0 + 10.0 * d as f64 + s as f64, 0, d, s, 0).unwrap();
            }
        }
        (portfolio, grid, cube)
    }

    #[test]
    fn test_identity_scaling_without_current_im() {
        let (portfolio, grid, cube) = fixture(None);
        let calc = DirectDimCalculator::new(&portfolio, &grid, &cube).unwrap();
        let unscaled = calc.unscaled_current_dim().unwrap();
        let built = calc.build().unwrap();
        assert_eq!(calc.scaling(0), ImScaling::Identity);
        assert_eq!(unscaled["NS_A"], built["NS_A"].t0);
        for d in 0..2 {
            for s in 0..3 {
                assert_eq!(built["NS_A"].values[d][s], cube.get(0, d, s, 0).unwrap());
            }
        }
    }

    #[test]
    fn test_scaled_to_current_im() {
        let (portfolio, grid, cube) = fixture(Some(50.0));
        let calc = DirectDimCalculator::new(&portfolio, &grid, &cube).unwrap();
        assert_eq!(calc.scaling(0), ImScaling::Scaled(0.25));
        let built = calc.build().unwrap();
        assert_relative_eq!(built["NS_A"].t0, 50.0);
        assert_relative_eq!(built["NS_A"].values[1][2], 0.25 * 112.0);
        assert_eq!(calc.unscaled_current_dim().unwrap()["NS_A"], 200.0);
    }

    #[test]
    fn test_missing_cell_names_netting_set_and_date() {
        let (portfolio, grid, _) = fixture(None);
        let mut cube = NpvCube::new(
            today(),
            vec!["NS_A".to_string()],
            grid.valuation_dates().to_vec(),
            1,
            1,
        )
        .unwrap();
        cube.set_t0(1.0, 0, 0).unwrap();
        cube.set(1.0, 0, 0, 0, 0).unwrap();
        let calc = DirectDimCalculator::new(&portfolio, &grid, &cube).unwrap();
        match calc.build() {
            Err(DimError::MissingData { netting_set, date, .. }) => {
                assert_eq!(netting_set, "NS_A");
                assert_eq!(date, ymd(2025, 1, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_export_dim_evolution() {
        let (portfolio, grid, cube) = fixture(None);
        let calc = DirectDimCalculator::new(&portfolio, &grid, &cube).unwrap();
        let mut report = InMemoryReport::new();
        calc.export_dim_evolution(&mut report).unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report.value(0, "TimeStep"), Some(&ReportValue::Size(0)));
        assert_eq!(report.value(0, "AverageDIM"), Some(&ReportValue::Real(200.0)));
        assert_eq!(report.value(1, "DaysInPeriod"), Some(&ReportValue::Size(182)));
        assert_eq!(report.value(2, "AverageDIM"), Some(&ReportValue::Real(111.0)));
        assert_eq!(report.value(2, "NettingSet"), Some(&ReportValue::Text("NS_A".to_string())));
    }
}
