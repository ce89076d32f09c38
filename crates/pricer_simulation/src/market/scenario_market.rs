//! Scenario market implementation.

use super::SimMarket;
use crate::error::SimulationError;
use crate::fixings::FixingManager;
use crate::scenario::Scenario;
use pricer_core::market_data::curves::{CreditCurve, CreditCurveEnum};
use pricer_core::market_data::MarketDataError;
use pricer_core::types::{Date, DayCountConvention, PricingError};
use pricer_models::indices::InterestRateIndex;
use pricer_models::market::{simple_forward, MarketView};
use pricer_models::models::LgmModel;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default curves by name, shared read-only between workers.
pub type CreditCurves = Arc<BTreeMap<String, CreditCurveEnum<f64>>>;

/// Market implied by the LGM state of one scenario.
///
/// The market has a valuation date (`asof`) and a model time. They normally
/// move together; a sticky-date update moves only the model state, so
/// instruments are valued on the default date's cash flows with the
/// close-out date's curve.
///
/// Discount factors from `asof` to `date` are model bond prices
/// `P(t, t + tau)` where `t` is the scenario time and `tau` the ACT/365
/// distance from `asof` to `date`.
#[derive(Debug, Clone)]
pub struct ScenarioSimMarket {
    model: Arc<LgmModel>,
    credit_curves: CreditCurves,
    today: Date,
    asof: Date,
    time: f64,
    state: f64,
    numeraire: f64,
    day_count: DayCountConvention,
    fixings: FixingManager,
}

impl ScenarioSimMarket {
    /// Creates the market positioned on today.
    pub fn new(
        model: Arc<LgmModel>,
        credit_curves: CreditCurves,
        today: Date,
        fixings: FixingManager,
    ) -> Result<Self, SimulationError> {
        let numeraire = model.numeraire(0.0, 0.0)?;
        Ok(Self {
            model,
            credit_curves,
            today,
            asof: today,
            time: 0.0,
            state: 0.0,
            numeraire,
            day_count: DayCountConvention::ActualActual365,
            fixings,
        })
    }

    /// Moves the market to `scenario`.
    ///
    /// With `update_date` the valuation date follows the scenario and every
    /// pending index fixing up to it is written from the simulated curve.
    /// Without it only the model state moves.
    pub fn update(
        &mut self,
        scenario: &Scenario,
        update_date: bool,
    ) -> Result<(), SimulationError> {
        self.time = scenario.time;
        self.state = scenario.state;
        self.numeraire = self.model.numeraire(scenario.time, scenario.state)?;
        if !update_date {
            return Ok(());
        }

        if scenario.date < self.asof {
            return Err(SimulationError::InvalidDates(format!(
                "scenario date {} precedes market date {}",
                scenario.date, self.asof
            )));
        }
        self.asof = scenario.date;

        let simulated = self
            .fixings
            .indices()
            .map(|index| Ok((index.name().to_string(), self.simulated_fixing(index)?)))
            .collect::<Result<Vec<(String, f64)>, SimulationError>>()?;
        let date = self.asof;
        self.fixings.update(date, |name| {
            simulated
                .iter()
                .find(|(index, _)| index == name)
                .map(|(_, value)| *value)
        })?;
        Ok(())
    }

    /// Puts the market back on today and restores the fixing history.
    pub fn reset_path(&mut self) -> Result<(), SimulationError> {
        self.fixings.reset();
        self.asof = self.today;
        self.time = 0.0;
        self.state = 0.0;
        self.numeraire = self.model.numeraire(0.0, 0.0)?;
        Ok(())
    }

    /// The fixing `index` would publish on the market date: the forward over
    /// the index tenor starting at the value date.
    pub fn simulated_fixing(&self, index: &InterestRateIndex) -> Result<f64, SimulationError> {
        let start = index.value_date(self.asof)?;
        let end = index.maturity_date(start)?;
        Ok(self.forward_rate(index, start, end)?)
    }

    /// Scenario time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// LGM state of the scenario.
    #[inline]
    pub fn state(&self) -> f64 {
        self.state
    }

    /// The driving model.
    #[inline]
    pub fn model(&self) -> &Arc<LgmModel> {
        &self.model
    }

    /// Names of the available default curves.
    pub fn credit_curve_names(&self) -> impl Iterator<Item = &str> {
        self.credit_curves.keys().map(String::as_str)
    }
}

impl MarketView for ScenarioSimMarket {
    fn asof(&self) -> Date {
        self.asof
    }

    fn discount(&self, date: Date) -> Result<f64, PricingError> {
        if date < self.asof {
            return Err(PricingError::MarketData(format!(
                "discount date {} precedes market date {}",
                date, self.asof
            )));
        }
        let tau = self.day_count.year_fraction_dates(self.asof, date);
        Ok(self
            .model
            .discount_bond(self.time, self.time + tau, self.state)?)
    }

    fn forward_rate(
        &self,
        index: &InterestRateIndex,
        start: Date,
        end: Date,
    ) -> Result<f64, PricingError> {
        simple_forward(
            self.discount(start)?,
            self.discount(end)?,
            index.day_count(),
            start,
            end,
        )
    }

    fn fixing(&self, index: &str, date: Date) -> Option<f64> {
        self.fixings.store().fixing(index, date)
    }
}

impl SimMarket for ScenarioSimMarket {
    fn today(&self) -> Date {
        self.today
    }

    fn numeraire(&self) -> f64 {
        self.numeraire
    }

    fn survival_probability(&self, curve: &str, date: Date) -> Result<f64, SimulationError> {
        let credit = self
            .credit_curves
            .get(curve)
            .ok_or_else(|| MarketDataError::CurveNotFound {
                name: curve.to_string(),
            })?;
        let t = self.day_count.year_fraction_dates(self.today, date);
        Ok(credit.survival_probability(t)?)
    }

    fn fixing_manager(&self) -> &FixingManager {
        &self.fixings
    }

    fn fixing_manager_mut(&mut self) -> &mut FixingManager {
        &mut self.fixings
    }

    fn as_market_view(&self) -> &dyn MarketView {
        self
    }
}
