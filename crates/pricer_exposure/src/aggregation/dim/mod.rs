//! Dynamic initial margin.
//!
//! A DIM calculator turns simulated margin inputs into an initial margin
//! per netting set, date and sample. Two flavours are provided:
//!
//! - [`DirectDimCalculator`] reads IM values the engine already wrote into
//!   the netting-set cube
//! - [`DynamicSimmCalculator`] computes a parametric VaR over the trade
//!   sensitivities stored in the trade cube
//!
//! Both rescale their output so that the t0 DIM matches the netting set's
//! actual initial margin when one is known (see [`ImScaling`]). Values are
//! in the unit of their inputs: deflated for the cube-based calculators.

mod direct;
mod simm;

pub use direct::DirectDimCalculator;
pub use simm::{horizon_date_index, DynamicSimmCalculator};

use crate::cube::CubeError;
use crate::date_grid::DateGrid;
use crate::margin::MarginError;
use crate::report::{ColumnType, Report, ReportError};
use pricer_core::types::{Date, DayCountConvention};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

/// DIM errors.
#[derive(Debug, Error)]
pub enum DimError {
    /// A margin input cell is missing.
    #[error("Missing DIM input for netting set {netting_set} on {date}: {source}")]
    MissingData {
        /// Netting set id.
        netting_set: String,
        /// Date of the missing cell.
        date: Date,
        /// Underlying cube error.
        #[source]
        source: CubeError,
    },

    /// Margin model failed.
    #[error("Margin error: {0}")]
    Margin(#[from] MarginError),

    /// Report output failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Inputs inconsistent with each other.
    #[error("Invalid DIM set-up: {0}")]
    InvalidSetup(String),
}

/// Maps a cube read failure to `MissingData` for a netting set and date.
pub(crate) fn missing(netting_set: &str, date: Date) -> impl FnOnce(CubeError) -> DimError + '_ {
    move |source| DimError::MissingData {
        netting_set: netting_set.to_string(),
        date,
        source,
    }
}

/// Scaling applied to model DIM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImScaling {
    /// Multiplied by `current IM / unscaled t0 DIM`.
    Scaled(f64),
    /// Left as computed.
    Identity,
}

impl ImScaling {
    /// Scaling from an actual t0 IM and the unscaled model t0 DIM.
    ///
    /// Identity without an actual IM or when the model t0 DIM is zero.
    pub fn from_t0(current_im: Option<f64>, unscaled_t0: f64) -> Self {
        match current_im {
            Some(im) if unscaled_t0 != 0.0 => ImScaling::Scaled(im / unscaled_t0),
            _ => ImScaling::Identity,
        }
    }

    /// Multiplicative factor.
    #[inline]
    pub fn factor(&self) -> f64 {
        match self {
            ImScaling::Scaled(f) => *f,
            ImScaling::Identity => 1.0,
        }
    }

    /// Applies the scaling.
    #[inline]
    pub fn apply(&self, dim: f64) -> f64 {
        dim * self.factor()
    }
}

/// Scaled DIM of one netting set.
#[derive(Debug, Clone, PartialEq)]
pub struct DimSeries {
    /// DIM today.
    pub t0: f64,
    /// DIM per grid date and sample, `values[date][sample]`.
    pub values: Vec<Vec<f64>>,
}

impl DimSeries {
    /// Sample average per grid date.
    pub fn expected(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|v| v.iter().sum::<f64>() / v.len().max(1) as f64)
            .collect()
    }
}

/// Shared interface of the DIM calculators.
pub trait DimCalculator {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Grid the DIM is computed on.
    fn grid(&self) -> &DateGrid;

    /// Number of samples.
    fn samples(&self) -> usize;

    /// Netting set ids, in output order.
    fn netting_set_ids(&self) -> &[String];

    /// Scaling of one netting set.
    fn scaling(&self, netting_set: usize) -> ImScaling;

    /// Model DIM today, before scaling.
    fn unscaled_t0(&self, netting_set: usize) -> Result<f64, DimError>;

    /// Model DIM on a grid date and sample, before scaling.
    fn unscaled_dim(&self, netting_set: usize, date: usize, sample: usize) -> Result<f64, DimError>;

    /// Unscaled t0 DIM by netting set.
    fn unscaled_current_dim(&self) -> Result<BTreeMap<String, f64>, DimError> {
        self.netting_set_ids()
            .iter()
            .enumerate()
            .map(|(n, id)| Ok((id.clone(), self.unscaled_t0(n)?)))
            .collect()
    }

    /// Scaled DIM of every netting set, date and sample.
    fn build(&self) -> Result<BTreeMap<String, DimSeries>, DimError> {
        let dates = self.grid().len();
        let samples = self.samples();
        let mut out = BTreeMap::new();
        for (n, id) in self.netting_set_ids().iter().enumerate() {
            let scaling = self.scaling(n);
            let t0 = scaling.apply(self.unscaled_t0(n)?);
            let values = (0..dates)
                .map(|d| {
                    (0..samples)
                        .map(|s| Ok(scaling.apply(self.unscaled_dim(n, d, s)?)))
                        .collect::<Result<Vec<f64>, DimError>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            out.insert(id.clone(), DimSeries { t0, values });
        }
        info!(calculator = self.name(), netting_sets = out.len(), "DIM built");
        Ok(out)
    }

    /// Writes expected DIM through time, one row per netting set and date
    /// with a t0 row (time step 0) first.
    fn export_dim_evolution(&self, report: &mut dyn Report) -> Result<(), DimError> {
        let series = self.build()?;
        let grid = self.grid();
        let today = grid.today();
        let dc = DayCountConvention::ActualActual365;

        report.add_column("TimeStep", ColumnType::Size, 0)?;
        report.add_column("Date", ColumnType::Date, 0)?;
        report.add_column("DaysInPeriod", ColumnType::Size, 0)?;
        report.add_column("AverageDIM", ColumnType::Real, 6)?;
        report.add_column("NettingSet", ColumnType::Text, 0)?;
        report.add_column("Time", ColumnType::Real, 6)?;

        for id in self.netting_set_ids() {
            let Some(s) = series.get(id) else { continue };
            report.next()?;
            report.add(0usize.into())?;
            report.add(today.into())?;
            report.add(0usize.into())?;
            report.add(s.t0.into())?;
            report.add(id.as_str().into())?;
            report.add(0.0f64.into())?;
            for (i, (date, dim)) in grid.valuation_dates().iter().zip(s.expected()).enumerate() {
                let days = grid.period_days(i).and_then(|d| usize::try_from(d).ok()).unwrap_or(0);
                report.next()?;
                report.add((i + 1).into())?;
                report.add((*date).into())?;
                report.add(days.into())?;
                report.add(dim.into())?;
                report.add(id.as_str().into())?;
                report.add(dc.year_fraction_dates(today, *date).into())?;
            }
        }
        report.end()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_from_t0() {
        assert_eq!(ImScaling::from_t0(Some(50.0), 100.0), ImScaling::Scaled(0.5));
        assert_eq!(ImScaling::from_t0(None, 100.0), ImScaling::Identity);
        assert_eq!(ImScaling::from_t0(Some(50.0), 0.0), ImScaling::Identity);
        assert_eq!(ImScaling::Scaled(0.5).apply(10.0), 5.0);
        assert_eq!(ImScaling::Identity.apply(10.0), 10.0);
    }

    #[test]
    fn test_expected_is_sample_mean() {
        let s = DimSeries {
            t0: 1.0,
            values: vec![vec![1.0, 3.0], vec![2.0, 2.0]],
        };
        assert_eq!(s.expected(), vec![2.0, 2.0]);
    }
}
