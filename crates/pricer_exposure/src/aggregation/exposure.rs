//! Exposure profiles per netting set.
//!
//! Profiles are computed from a netted cube (see
//! [`net_trade_values`](super::net_trade_values)). Index 0 of every profile
//! is today, from the T0 slice; index `i + 1` is cube date `i`.
//!
//! - EE(t) = E[max(V(t), 0)]
//! - ENE(t) = E[max(-V(t), 0)]
//! - PFE(t, q) = the `round((n - 1) q)`-th smallest positive exposure
//!
//! Values stay in the unit of the cube: deflated for default dates,
//! re-inflated by the close-out numeraire for close-out values.

use super::AggregationError;
use crate::cube::NpvCube;
use crate::report::{ColumnType, Report, ReportError};
use pricer_core::types::{Date, DayCountConvention};
use rayon::prelude::*;

/// Exposure profile of one netting set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureProfile {
    /// Netting set id.
    pub netting_set: String,
    /// Today followed by the cube dates.
    pub dates: Vec<Date>,
    /// ACT/365 times of `dates`.
    pub times: Vec<f64>,
    /// Expected exposure.
    pub ee: Vec<f64>,
    /// Expected negative exposure, as a positive magnitude.
    pub ene: Vec<f64>,
    /// Potential future exposure.
    pub pfe: Vec<f64>,
    /// Expected positive close-out exposure, if the cube has close-out values.
    pub close_out_ee: Option<Vec<f64>>,
}

impl ExposureProfile {
    /// Time-averaged EE by trapezoidal integration.
    pub fn epe(&self) -> f64 {
        let total = match self.times.last() {
            Some(t) if *t > 0.0 => *t,
            _ => return self.ee.first().copied().unwrap_or(0.0),
        };
        let integral: f64 = self
            .times
            .windows(2)
            .zip(self.ee.windows(2))
            .map(|(t, e)| 0.5 * (e[0] + e[1]) * (t[1] - t[0]))
            .sum();
        integral / total
    }

    /// Largest PFE over the profile.
    #[inline]
    pub fn peak_pfe(&self) -> f64 {
        self.pfe.iter().copied().fold(0.0_f64, f64::max)
    }
}

fn quantile_index(samples: usize, confidence: f64) -> usize {
    let idx = ((samples as f64 - 1.0) * confidence).round() as usize;
    idx.min(samples - 1)
}

fn profile(
    netted: &NpvCube,
    id: usize,
    confidence: f64,
) -> Result<ExposureProfile, AggregationError> {
    let samples = netted.samples();
    let today = netted.asof();
    let dc = DayCountConvention::ActualActual365;
    let q_idx = quantile_index(samples, confidence);

    let dates: Vec<Date> = std::iter::once(today).chain(netted.dates().iter().copied()).collect();
    let times = dates.iter().map(|d| dc.year_fraction_dates(today, *d)).collect();

    let v0 = netted.get_t0(id, 0)?;
    let mut ee = vec![v0.max(0.0)];
    let mut ene = vec![(-v0).max(0.0)];
    let mut pfe = vec![v0.max(0.0)];
    let mut close_out_ee = (netted.depth() > 1).then(|| vec![v0.max(0.0)]);

    let mut values = vec![0.0; samples];
    for date in 0..netted.num_dates() {
        for (s, v) in values.iter_mut().enumerate() {
            *v = netted.get(id, date, s, 0)?;
        }
        ee.push(values.iter().map(|v| v.max(0.0)).sum::<f64>() / samples as f64);
        ene.push(values.iter().map(|v| (-v).max(0.0)).sum::<f64>() / samples as f64);
        let mut positive: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
        positive.sort_by(|a, b| a.total_cmp(b));
        pfe.push(positive[q_idx]);

        if let Some(co) = close_out_ee.as_mut() {
            let mut sum = 0.0;
            for s in 0..samples {
                sum += netted.get(id, date, s, 1)?.max(0.0);
            }
            co.push(sum / samples as f64);
        }
    }

    Ok(ExposureProfile {
        netting_set: netted.ids()[id].clone(),
        dates,
        times,
        ee,
        ene,
        pfe,
        close_out_ee,
    })
}

/// Exposure profiles of every netting set of a netted cube.
///
/// # Errors
///
/// - `InvalidConfidence` unless `0 < confidence < 1`
/// - `Cube` if a cell is unwritten
pub fn exposure_profiles(
    netted: &NpvCube,
    confidence: f64,
) -> Result<Vec<ExposureProfile>, AggregationError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AggregationError::InvalidConfidence(confidence));
    }
    (0..netted.num_ids())
        .into_par_iter()
        .map(|id| profile(netted, id, confidence))
        .collect()
}

/// Writes profiles to `report`, one row per netting set and date.
pub fn export_exposure_profiles(
    profiles: &[ExposureProfile],
    report: &mut dyn Report,
) -> Result<(), ReportError> {
    let with_close_out = profiles.iter().all(|p| p.close_out_ee.is_some()) && !profiles.is_empty();
    report.add_column("NettingSet", ColumnType::Text, 0)?;
    report.add_column("Date", ColumnType::Date, 0)?;
    report.add_column("Time", ColumnType::Real, 6)?;
    report.add_column("EE", ColumnType::Real, 2)?;
    report.add_column("ENE", ColumnType::Real, 2)?;
    report.add_column("PFE", ColumnType::Real, 2)?;
    if with_close_out {
        report.add_column("CloseOutEE", ColumnType::Real, 2)?;
    }
    for p in profiles {
        for i in 0..p.dates.len() {
            report.next()?;
            report.add(p.netting_set.as_str().into())?;
            report.add(p.dates[i].into())?;
            report.add(p.times[i].into())?;
            report.add(p.ee[i].into())?;
            report.add(p.ene[i].into())?;
            report.add(p.pfe[i].into())?;
            if let (true, Some(co)) = (with_close_out, &p.close_out_ee) {
                report.add(co[i].into())?;
            }
        }
    }
    report.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{InMemoryReport, ReportValue};
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn netted(values: &[f64], close_out: bool) -> NpvCube {
        let depth = 1 + usize::from(close_out);
        let mut cube = NpvCube::new(
            ymd(2024, 1, 1),
            vec!["NS".to_string()],
            vec![ymd(2025, 1, 1)],
            values.len(),
            depth,
        )
        .unwrap();
        cube.set_t0(-3.0, 0, 0).unwrap();
        if close_out {
            cube.set_t0(-3.0, 0, 1).unwrap();
        }
        for (s, v) in values.iter().enumerate() {
            cube.set(*v, 0, 0, s, 0).unwrap();
            if close_out {
                cube.set(2.0 * v, 0, 0, s, 1).unwrap();
            }
        }
        cube
    }

    #[test]
    fn test_profile_statistics() {
        let cube = netted(&[10.0, -20.0, 30.0, 0.0, 5.0], true);
        let profiles = exposure_profiles(&cube, 0.75).unwrap();
        let p = &profiles[0];
        assert_eq!(p.dates.len(), 2);
        assert_eq!(p.ee[0], 0.0);
        assert_eq!(p.ene[0], 3.0);
        assert_relative_eq!(p.ee[1], 45.0 / 5.0);
        assert_relative_eq!(p.ene[1], 20.0 / 5.0);
        // positives sorted: 0, 0, 5, 10, 30; index round(4 * 0.75) = 3
        assert_eq!(p.pfe[1], 10.0);
        assert_relative_eq!(p.close_out_ee.as_ref().unwrap()[1], 90.0 / 5.0);
        assert_eq!(p.peak_pfe(), 10.0);
    }

    #[test]
    fn test_epe_is_time_average() {
        let cube = netted(&[4.0, 4.0], false);
        let p = &exposure_profiles(&cube, 0.9).unwrap()[0];
        // EE goes 0 -> 4 linearly over the year.
        assert_relative_eq!(p.epe(), 2.0, epsilon = 1e-12);
        assert!(p.close_out_ee.is_none());
    }

    #[test]
    fn test_invalid_confidence() {
        let cube = netted(&[1.0], false);
        assert!(matches!(
            exposure_profiles(&cube, 1.0),
            Err(AggregationError::InvalidConfidence(_))
        ));
    }

    #[test]
    fn test_export_rows() {
        let cube = netted(&[1.0, 3.0], true);
        let profiles = exposure_profiles(&cube, 0.95).unwrap();
        let mut report = InMemoryReport::new();
        export_exposure_profiles(&profiles, &mut report).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.columns().len(), 7);
        assert_eq!(report.value(1, "EE"), Some(&ReportValue::Real(2.0)));
        assert_eq!(report.value(0, "Date"), Some(&ReportValue::Date(ymd(2024, 1, 1))));
    }
}
