//! Valuation calculators.
//!
//! Calculators are invoked by the valuation engine for every trade on every
//! simulation step and write into the cubes they own slots of. The set is
//! closed and dispatched statically through [`Calculator`]:
//!
//! | Calculator | Writes |
//! |------------|--------|
//! | [`NpvCalculator`] | deflated NPV, optional close-out NPV |
//! | [`MporCalculator`] | deflated NPV and close-out NPV |
//! | [`SensitivityCalculator`] | bucketed 1bp deltas, one depth slot per bucket |
//! | [`SurvivalProbabilityCalculator`] | counterparty survival probabilities |
//! | [`DirectImCalculator`] | netting-set initial margin |
//!
//! Several calculators write into the same cube at different depth slots;
//! the engine runs them in the order given, so aggregate calculators can
//! read what trade-level calculators wrote on the same step.

mod direct_im;
mod mpor;
mod npv;
mod sensitivity;
mod survival;

pub use direct_im::DirectImCalculator;
pub use mpor::MporCalculator;
pub use npv::NpvCalculator;
pub use sensitivity::SensitivityCalculator;
pub use survival::{
    counterparty_cube_ids, SurvivalOutcome, SurvivalProbabilityCalculator, FALLBACK_SLOT,
    PROBABILITY_SLOT,
};

use crate::cube::{CubeError, NpvCube, SampleSliceMut};
use crate::margin::MarginError;
use crate::portfolio::{Portfolio, Trade};
use pricer_core::types::PricingError;
use pricer_simulation::market::SimMarket;
use pricer_simulation::SimulationError;
use thiserror::Error;

/// Calculator failures.
///
/// `Pricing` is a per-trade failure the engine recovers from; every other
/// variant aborts the run.
#[derive(Debug, Error)]
pub enum CalculatorError {
    /// The instrument could not be valued.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    /// Cube access failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// Margin calculation failed.
    #[error("Margin error: {0}")]
    Margin(#[from] MarginError),

    /// Simulated market failure.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// A calculator needs a cube the engine did not allocate.
    #[error("Calculator {calculator} needs the {cube} cube")]
    MissingOutput {
        /// Calculator name.
        calculator: &'static str,
        /// Cube name.
        cube: &'static str,
    },

    /// Calculator configuration inconsistent with the portfolio or cubes.
    #[error("Calculator {calculator} misconfigured: {reason}")]
    Configuration {
        /// Calculator name.
        calculator: &'static str,
        /// What is wrong.
        reason: String,
    },
}

/// The per-sample cube blocks a calculator writes into.
#[derive(Debug)]
pub struct SampleOutputs<'a> {
    /// Trade cube block.
    pub trades: SampleSliceMut<'a>,
    /// Counterparty cube block.
    pub counterparties: Option<SampleSliceMut<'a>>,
    /// Netting-set cube block.
    pub netting_sets: Option<SampleSliceMut<'a>>,
}

/// The cubes a calculator writes T0 values into.
#[derive(Debug)]
pub struct T0Outputs<'a> {
    /// Trade cube.
    pub trades: &'a mut NpvCube,
    /// Counterparty cube.
    pub counterparties: Option<&'a mut NpvCube>,
    /// Netting-set cube.
    pub netting_sets: Option<&'a mut NpvCube>,
}

/// Behaviour shared by all calculators.
pub trait ValuationCalculator {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Called once per worker before any valuation.
    fn init(
        &mut self,
        _portfolio: &Portfolio,
        _market: &dyn SimMarket,
    ) -> Result<(), CalculatorError> {
        Ok(())
    }

    /// Called at the start of every sample.
    fn init_scenario(&mut self) {}

    /// Values one trade on one simulation step.
    fn calculate(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut SampleOutputs<'_>,
        date_index: usize,
        is_close_out: bool,
    ) -> Result<(), CalculatorError>;

    /// Values one trade today.
    fn calculate_t0(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError>;

    /// Called once per step after every trade was valued.
    fn calculate_aggregate(
        &mut self,
        _portfolio: &Portfolio,
        _market: &dyn SimMarket,
        _output: &mut SampleOutputs<'_>,
        _date_index: usize,
        _is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        Ok(())
    }

    /// Called once today after every trade was valued.
    fn calculate_aggregate_t0(
        &mut self,
        _portfolio: &Portfolio,
        _market: &dyn SimMarket,
        _output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        Ok(())
    }
}

/// Deflated value of a trade: NPV in the market divided by the numeraire.
pub fn deflated_npv(trade: &Trade, market: &dyn SimMarket) -> Result<f64, CalculatorError> {
    let npv = trade.instrument().npv(market.as_market_view())?;
    Ok(npv / market.numeraire())
}

/// Any calculator.
#[derive(Debug, Clone)]
pub enum Calculator {
    /// NPV.
    Npv(NpvCalculator),
    /// NPV with margin-period close-out.
    Mpor(MporCalculator),
    /// Bucketed deltas.
    Sensitivity(SensitivityCalculator),
    /// Counterparty survival probabilities.
    SurvivalProbability(SurvivalProbabilityCalculator),
    /// Netting-set initial margin.
    DirectIm(DirectImCalculator),
}

macro_rules! dispatch {
    ($self:ident, $calc:ident => $body:expr) => {
        match $self {
            Calculator::Npv($calc) => $body,
            Calculator::Mpor($calc) => $body,
            Calculator::Sensitivity($calc) => $body,
            Calculator::SurvivalProbability($calc) => $body,
            Calculator::DirectIm($calc) => $body,
        }
    };
}

impl ValuationCalculator for Calculator {
    fn name(&self) -> &'static str {
        dispatch!(self, c => c.name())
    }

    fn init(
        &mut self,
        portfolio: &Portfolio,
        market: &dyn SimMarket,
    ) -> Result<(), CalculatorError> {
        dispatch!(self, c => c.init(portfolio, market))
    }

    fn init_scenario(&mut self) {
        dispatch!(self, c => c.init_scenario())
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
        dispatch!(self, c => {
            c.calculate(trade, trade_index, market, output, date_index, is_close_out)
        })
    }

    fn calculate_t0(
        &mut self,
        trade: &Trade,
        trade_index: usize,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        dispatch!(self, c => c.calculate_t0(trade, trade_index, market, output))
    }

    fn calculate_aggregate(
        &mut self,
        portfolio: &Portfolio,
        market: &dyn SimMarket,
        output: &mut SampleOutputs<'_>,
        date_index: usize,
        is_close_out: bool,
    ) -> Result<(), CalculatorError> {
        dispatch!(self, c => {
            c.calculate_aggregate(portfolio, market, output, date_index, is_close_out)
        })
    }

    fn calculate_aggregate_t0(
        &mut self,
        portfolio: &Portfolio,
        market: &dyn SimMarket,
        output: &mut T0Outputs<'_>,
    ) -> Result<(), CalculatorError> {
        dispatch!(self, c => c.calculate_aggregate_t0(portfolio, market, output))
    }
}

impl From<NpvCalculator> for Calculator {
    fn from(c: NpvCalculator) -> Self {
        Calculator::Npv(c)
    }
}

impl From<MporCalculator> for Calculator {
    fn from(c: MporCalculator) -> Self {
        Calculator::Mpor(c)
    }
}

impl From<SensitivityCalculator> for Calculator {
    fn from(c: SensitivityCalculator) -> Self {
        Calculator::Sensitivity(c)
    }
}

impl From<SurvivalProbabilityCalculator> for Calculator {
    fn from(c: SurvivalProbabilityCalculator) -> Self {
        Calculator::SurvivalProbability(c)
    }
}

impl From<DirectImCalculator> for Calculator {
    fn from(c: DirectImCalculator) -> Self {
        Calculator::DirectIm(c)
    }
}
