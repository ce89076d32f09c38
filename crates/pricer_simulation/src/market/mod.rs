//! Simulated markets.
//!
//! - [`SimMarket`]: what valuation calculators need from a market
//! - [`ScenarioSimMarket`]: LGM-driven market moved along a path
//! - [`ShiftedMarket`]: key-rate bumped view used for sensitivities

mod scenario_market;
mod shift;

pub use scenario_market::{CreditCurves, ScenarioSimMarket};
pub use shift::{KeyRateBuckets, ShiftedMarket};

use crate::error::SimulationError;
use crate::fixings::FixingManager;
use pricer_core::types::Date;
use pricer_models::market::MarketView;

/// A market positioned on one simulated scenario.
pub trait SimMarket: MarketView {
    /// The simulation start date.
    fn today(&self) -> Date;

    /// Numeraire of the current scenario.
    fn numeraire(&self) -> f64;

    /// Survival probability to `date` on the named default curve.
    fn survival_probability(&self, curve: &str, date: Date) -> Result<f64, SimulationError>;

    /// The fixing manager owned by this market.
    fn fixing_manager(&self) -> &FixingManager;

    /// Mutable access to the owned fixing manager.
    fn fixing_manager_mut(&mut self) -> &mut FixingManager;

    /// The market as a plain pricing view.
    fn as_market_view(&self) -> &dyn MarketView;
}
