//! LGM state paths.
//!
//! A path is the model state on every simulation date of one sample. Each
//! step draws an exact Gaussian increment with variance
//! `zeta(t1) - zeta(t0)`, so paths are exact on any grid and need no
//! sub-stepping.

use crate::error::SimulationError;
use crate::rng::PricerRng;
use pricer_core::types::{Date, DayCountConvention};
use pricer_models::models::LgmModel;
use std::sync::Arc;
use tracing::debug;

/// Model state on one simulation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    /// Simulation date.
    pub date: Date,
    /// Model time of `date`, ACT/365 from today.
    pub time: f64,
    /// LGM state variable.
    pub state: f64,
}

impl Scenario {
    /// The scenario of today: time and state zero.
    pub fn today(date: Date) -> Self {
        Self {
            date,
            time: 0.0,
            state: 0.0,
        }
    }
}

/// Generates LGM paths over a fixed date grid.
///
/// Sample `s` draws from `PricerRng::for_sample(seed, s)`, so a path depends
/// only on `(seed, s)` and not on the thread or the order samples run in.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pricer_core::market_data::curves::CurveEnum;
/// use pricer_core::types::Date;
/// use pricer_models::models::LgmModel;
/// use pricer_simulation::scenario::LgmPathGenerator;
///
/// let model = Arc::new(LgmModel::new(0.01, 0.01, CurveEnum::flat(0.02)).unwrap());
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let dates = [Date::from_ymd(2025, 1, 1).unwrap(), Date::from_ymd(2026, 1, 1).unwrap()];
/// let generator = LgmPathGenerator::new(model, today, &dates, 42).unwrap();
///
/// let path = generator.path(3);
/// assert_eq!(path.len(), 2);
/// assert_eq!(path, generator.path(3));
/// ```
#[derive(Debug, Clone)]
pub struct LgmPathGenerator {
    model: Arc<LgmModel>,
    today: Date,
    dates: Vec<Date>,
    times: Vec<f64>,
    std_devs: Vec<f64>,
    seed: u64,
}

impl LgmPathGenerator {
    /// Creates a generator over `dates`.
    ///
    /// # Errors
    ///
    /// `InvalidDates` if the grid is empty, decreasing or starts before today.
    /// Repeated dates are allowed and get a zero increment.
    pub fn new(
        model: Arc<LgmModel>,
        today: Date,
        dates: &[Date],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        if dates.is_empty() {
            return Err(SimulationError::InvalidDates("empty simulation grid".to_string()));
        }
        if dates[0] < today {
            return Err(SimulationError::InvalidDates(format!(
                "first simulation date {} precedes today {}",
                dates[0], today
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] < w[0]) {
            return Err(SimulationError::InvalidDates(format!(
                "simulation date {} precedes {}",
                pair[1], pair[0]
            )));
        }

        let dc = DayCountConvention::ActualActual365;
        let times: Vec<f64> = dates.iter().map(|d| dc.year_fraction_dates(today, *d)).collect();
        let mut previous = 0.0;
        let std_devs = times
            .iter()
            .map(|t| {
                let sd = model.increment_std_dev(previous, *t);
                previous = *t;
                sd
            })
            .collect();

        debug!(dates = dates.len(), seed, "scenario generator ready");
        Ok(Self {
            model,
            today,
            dates: dates.to_vec(),
            times,
            std_devs,
            seed,
        })
    }

    /// The model paths are drawn from.
    #[inline]
    pub fn model(&self) -> &Arc<LgmModel> {
        &self.model
    }

    /// Today.
    #[inline]
    pub fn today(&self) -> Date {
        self.today
    }

    /// Simulation dates.
    #[inline]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Base seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The path of one sample, one scenario per grid date.
    pub fn path(&self, sample: usize) -> Vec<Scenario> {
        let mut rng = PricerRng::for_sample(self.seed, sample);
        let mut state = 0.0;
        self.dates
            .iter()
            .zip(self.times.iter().zip(&self.std_devs))
            .map(|(date, (time, sd))| {
                state += sd * rng.gen_normal();
                Scenario {
                    date: *date,
                    time: *time,
                    state,
                }
            })
            .collect()
    }
}
