//! Valuation engine.
//!
//! The engine values every trade of a portfolio on every step of a date
//! grid, for every Monte Carlo sample, and stores the results in cubes:
//!
//! - the trade cube (`trades x valuation dates x samples x depth`)
//! - an optional counterparty cube (survival probabilities)
//! - an optional netting-set cube (initial margin)
//! - a scenario data cube with the numeraire of every valuation and
//!   close-out step
//!
//! Samples run in parallel on rayon. Each worker owns a clone of the
//! simulated market (and with it the fixing manager) and of the
//! calculators; the cubes are split into disjoint per-sample slices, so no
//! cell is shared between threads. Dates within a sample run in order.
//!
//! # Failures
//!
//! A pricing failure marks the trade as failed: it is skipped for the rest
//! of the run and all its cells are set to zero afterwards. Any other error
//! aborts the run. A run can be cancelled through [`ValuationEngine::cancel_flag`];
//! the flag is checked between samples.

use crate::calculators::{
    counterparty_cube_ids, Calculator, CalculatorError, DirectImCalculator, MporCalculator,
    NpvCalculator, SampleOutputs, SensitivityCalculator, SurvivalProbabilityCalculator, T0Outputs,
    ValuationCalculator,
};
use crate::cube::{CubeError, NpvCube, SampleSliceMut};
use crate::date_grid::{DateGrid, GridStep};
use crate::margin::ParametricVar;
use crate::portfolio::{Portfolio, Trade, TradeId};
use pricer_core::types::{Date, PricingError};
use pricer_simulation::market::{KeyRateBuckets, ScenarioSimMarket, SimMarket};
use pricer_simulation::scenario::{LgmPathGenerator, Scenario};
use pricer_simulation::{ConfigError, SimulationConfig, SimulationError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scenario data id of the valuation-date numeraire.
pub const NUMERAIRE_ID: &str = "Numeraire";

/// Scenario data id of the close-out numeraire.
pub const CLOSE_OUT_NUMERAIRE_ID: &str = "CloseOutNumeraire";

/// Valuation engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Simulation parameters rejected.
    #[error("Simulation configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine set-up inconsistent.
    #[error("Invalid engine set-up: {0}")]
    InvalidSetup(String),

    /// Cube allocation or access failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// A calculator failed fatally.
    #[error("Calculator error: {0}")]
    Calculator(#[from] CalculatorError),

    /// Scenario generation or market update failed.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Cancelled through the cancel flag.
    #[error("Run cancelled after {completed} completed samples")]
    Cancelled {
        /// Samples finished before the cancellation was seen.
        completed: usize,
    },
}

/// How the market moves to a close-out date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MporMode {
    /// Only the model state moves; the valuation date and the fixings stay
    /// on the default date.
    #[default]
    StickyDate,
    /// The valuation date moves to the close-out date and fixings are
    /// written up to it.
    ActualDate,
}

/// Depth slots of the trade cube and the side cubes to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeLayout {
    /// Slot of the deflated default-date NPV.
    pub npv: usize,
    /// Slot of the close-out NPV.
    pub close_out: Option<usize>,
    /// First slot and bucket count of the sensitivities.
    pub sensitivities: Option<(usize, usize)>,
    /// Depth of the trade cube.
    pub trade_depth: usize,
    /// Whether a counterparty cube is allocated.
    pub counterparty_cube: bool,
    /// Whether a netting-set cube is allocated.
    pub netting_set_cube: bool,
}

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use pricer_exposure::engine::{EngineConfig, MporMode};
/// use pricer_simulation::SimulationConfig;
///
/// let config = EngineConfig::builder()
///     .simulation(SimulationConfig::builder().samples(100).build().unwrap())
///     .mpor_mode(MporMode::ActualDate)
///     .survival(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.simulation().samples(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    simulation: SimulationConfig,
    mpor_mode: MporMode,
    sensitivities: Option<KeyRateBuckets>,
    initial_margin: Option<ParametricVar>,
    survival: bool,
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Samples, seed and threads.
    #[inline]
    pub fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Close-out market mode.
    #[inline]
    pub fn mpor_mode(&self) -> MporMode {
        self.mpor_mode
    }

    /// Key-rate buckets of the sensitivity slots.
    #[inline]
    pub fn sensitivities(&self) -> Option<&KeyRateBuckets> {
        self.sensitivities.as_ref()
    }

    /// Margin model of the netting-set IM.
    #[inline]
    pub fn initial_margin(&self) -> Option<&ParametricVar> {
        self.initial_margin.as_ref()
    }

    /// Whether survival probabilities are computed.
    #[inline]
    pub fn survival(&self) -> bool {
        self.survival
    }

    /// Trade-cube depth layout for `grid`: NPV first, then the close-out
    /// NPV if the grid has close-out dates, then one slot per bucket.
    pub fn layout(&self, grid: &DateGrid) -> CubeLayout {
        let close_out = grid.has_close_out().then_some(1);
        let first_sensitivity = 1 + usize::from(close_out.is_some());
        let sensitivities = self
            .sensitivities
            .as_ref()
            .map(|b| (first_sensitivity, b.len()));
        CubeLayout {
            npv: 0,
            close_out,
            sensitivities,
            trade_depth: first_sensitivity + sensitivities.map_or(0, |(_, n)| n),
            counterparty_cube: self.survival,
            netting_set_cube: self.initial_margin.is_some(),
        }
    }

    /// The calculators filling `layout`, trade-level ones first.
    pub fn calculators(&self, layout: &CubeLayout) -> Vec<Calculator> {
        let mut calculators: Vec<Calculator> = Vec::new();
        calculators.push(match layout.close_out {
            Some(slot) => MporCalculator::new(layout.npv, slot).into(),
            None => NpvCalculator::new(layout.npv).into(),
        });
        if let (Some(buckets), Some((first, _))) = (&self.sensitivities, layout.sensitivities) {
            calculators.push(SensitivityCalculator::new(buckets.clone(), first).into());
            if let Some(var) = &self.initial_margin {
                calculators.push(DirectImCalculator::new(var.clone(), first).into());
            }
        }
        if self.survival {
            calculators.push(SurvivalProbabilityCalculator::new().into());
        }
        calculators
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    simulation: Option<SimulationConfig>,
    mpor_mode: MporMode,
    sensitivities: Option<KeyRateBuckets>,
    initial_margin: Option<ParametricVar>,
    survival: bool,
}

impl EngineConfigBuilder {
    /// Sets samples, seed and threads.
    #[inline]
    pub fn simulation(mut self, simulation: SimulationConfig) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Sets the close-out market mode.
    #[inline]
    pub fn mpor_mode(mut self, mode: MporMode) -> Self {
        self.mpor_mode = mode;
        self
    }

    /// Stores key-rate sensitivities.
    #[inline]
    pub fn sensitivities(mut self, buckets: KeyRateBuckets) -> Self {
        self.sensitivities = Some(buckets);
        self
    }

    /// Computes netting-set IM from the sensitivities.
    #[inline]
    pub fn initial_margin(mut self, var: ParametricVar) -> Self {
        self.initial_margin = Some(var);
        self
    }

    /// Enables the counterparty cube.
    #[inline]
    pub fn survival(mut self, survival: bool) -> Self {
        self.survival = survival;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `Config` if the simulation parameters are missing or invalid
    /// - `InvalidSetup` if initial margin is requested without matching
    ///   sensitivity buckets
    pub fn build(self) -> Result<EngineConfig, EngineError> {
        let simulation = self
            .simulation
            .ok_or(ConfigError::MissingParameter("simulation"))?;
        simulation.validate()?;
        if let Some(var) = &self.initial_margin {
            match &self.sensitivities {
                None => {
                    return Err(EngineError::InvalidSetup(
                        "initial margin needs sensitivities".to_string(),
                    ))
                }
                Some(buckets) if buckets.len() != var.buckets() => {
                    return Err(EngineError::InvalidSetup(format!(
                        "margin model has {} buckets, sensitivities have {}",
                        var.buckets(),
                        buckets.len()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(EngineConfig {
            simulation,
            mpor_mode: self.mpor_mode,
            sensitivities: self.sensitivities,
            initial_margin: self.initial_margin,
            survival: self.survival,
        })
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct EngineOutput {
    /// Trade cube.
    pub trades: NpvCube,
    /// Counterparty cube, if allocated.
    pub counterparties: Option<NpvCube>,
    /// Netting-set cube, if allocated.
    pub netting_sets: Option<NpvCube>,
    /// Numeraire per valuation and close-out step.
    pub scenario_data: NpvCube,
    /// Depth layout of the trade cube.
    pub layout: CubeLayout,
    /// Trades whose cells were zeroed after a pricing failure.
    pub failed_trades: Vec<TradeId>,
    /// Survival probabilities that fell back to 1.0.
    pub survival_fallbacks: usize,
}

/// Per-worker state: the market and the calculators.
#[derive(Debug, Clone)]
struct Worker {
    market: ScenarioSimMarket,
    calculators: Vec<Calculator>,
    warned: bool,
}

/// Read-only data shared by all workers of a run.
struct RunContext<'a> {
    portfolio: &'a Portfolio,
    steps: &'a [GridStep],
    mode: MporMode,
    failed: &'a [AtomicBool],
}

impl RunContext<'_> {
    #[inline]
    fn is_failed(&self, trade: usize) -> bool {
        self.failed[trade].load(Ordering::Relaxed)
    }

    fn mark_failed(&self, trade: usize) {
        self.failed[trade].store(true, Ordering::Relaxed);
    }
}

fn log_failure(
    warned: &mut bool,
    trade: &Trade,
    date: Date,
    sample: Option<usize>,
    err: &PricingError,
) {
    if !*warned {
        *warned = true;
        warn!(
            trade = %trade.id(),
            %date,
            ?sample,
            error = %err,
            "Trade valuation failed, cells will be zeroed"
        );
    } else {
        debug!(trade = %trade.id(), %date, ?sample, error = %err, "Trade valuation failed");
    }
}

impl Worker {
    fn run_t0(
        &mut self,
        ctx: &RunContext<'_>,
        output: &mut T0Outputs<'_>,
        scenario_data: &mut NpvCube,
    ) -> Result<(), EngineError> {
        let today = self.market.today();
        for id in 0..scenario_data.num_ids() {
            scenario_data.set_t0(self.market.numeraire(), id, 0)?;
        }
        for (i, trade) in ctx.portfolio.trades().iter().enumerate() {
            for calc in self.calculators.iter_mut() {
                match calc.calculate_t0(trade, i, &self.market, output) {
                    Ok(()) => {}
                    Err(CalculatorError::Pricing(err)) => {
                        log_failure(&mut self.warned, trade, today, None, &err);
                        ctx.mark_failed(i);
                        output.trades.fill_t0(i, 0.0)?;
                        break;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        for calc in self.calculators.iter_mut() {
            calc.calculate_aggregate_t0(ctx.portfolio, &self.market, output)?;
        }
        Ok(())
    }

    fn run_sample(
        &mut self,
        ctx: &RunContext<'_>,
        path: &[Scenario],
        output: &mut SampleOutputs<'_>,
        scenario_data: &mut SampleSliceMut<'_>,
    ) -> Result<(), EngineError> {
        let sample = output.trades.sample();
        self.market.reset_path()?;
        for calc in self.calculators.iter_mut() {
            calc.init_scenario();
        }

        for (step, scenario) in ctx.steps.iter().zip(path) {
            let update_date = !(step.is_close_out && ctx.mode == MporMode::StickyDate);
            self.market.update(scenario, update_date)?;
            let date_index = step.valuation_index;
            let numeraire_id = usize::from(step.is_close_out);
            scenario_data.set(self.market.numeraire(), numeraire_id, date_index, 0)?;

            for (i, trade) in ctx.portfolio.trades().iter().enumerate() {
                if ctx.is_failed(i) {
                    output.trades.fill_cell(0.0, i, date_index)?;
                    continue;
                }
                for calc in self.calculators.iter_mut() {
                    let result = calc.calculate(
                        trade,
                        i,
                        &self.market,
                        output,
                        date_index,
                        step.is_close_out,
                    );
                    match result {
                        Ok(()) => {}
                        Err(CalculatorError::Pricing(err)) => {
                            log_failure(&mut self.warned, trade, step.date, Some(sample), &err);
                            ctx.mark_failed(i);
                            output.trades.fill_cell(0.0, i, date_index)?;
                            break;
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            }

            for calc in self.calculators.iter_mut() {
                calc.calculate_aggregate(
                    ctx.portfolio,
                    &self.market,
                    output,
                    date_index,
                    step.is_close_out,
                )?;
            }
        }
        Ok(())
    }
}

/// Fills exposure cubes by Monte Carlo simulation.
///
/// # Examples
///
/// ```no_run
/// # use pricer_exposure::engine::{EngineConfig, ValuationEngine};
/// # fn run(engine: ValuationEngine) -> Result<(), Box<dyn std::error::Error>> {
/// let output = engine.run()?;
/// println!("{} trades failed", output.failed_trades.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ValuationEngine {
    portfolio: Portfolio,
    grid: DateGrid,
    market: ScenarioSimMarket,
    config: EngineConfig,
    cancel: Arc<AtomicBool>,
}

impl ValuationEngine {
    /// Creates an engine.
    ///
    /// `market` must be positioned on the grid's today. Its fixing manager
    /// is initialised against the portfolio.
    ///
    /// # Errors
    ///
    /// `InvalidSetup` if the portfolio is empty or the market and grid
    /// disagree on today.
    pub fn new(
        portfolio: Portfolio,
        grid: DateGrid,
        mut market: ScenarioSimMarket,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        if portfolio.is_empty() {
            return Err(EngineError::InvalidSetup("portfolio is empty".to_string()));
        }
        if market.today() != grid.today() {
            return Err(EngineError::InvalidSetup(format!(
                "market today {} differs from grid today {}",
                market.today(),
                grid.today()
            )));
        }
        market.reset_path()?;
        market.fixing_manager_mut().initialise(&portfolio);
        Ok(Self {
            portfolio,
            grid,
            market,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shares an external cancel flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that cancels the run when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The portfolio.
    #[inline]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// The date grid.
    #[inline]
    pub fn grid(&self) -> &DateGrid {
        &self.grid
    }

    /// The configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs with the calculators and layout the configuration implies.
    pub fn run(&self) -> Result<EngineOutput, EngineError> {
        let layout = self.config.layout(&self.grid);
        let calculators = self.config.calculators(&layout);
        self.run_with(calculators, layout)
    }

    /// Runs `calculators` in order over cubes shaped by `layout`.
    pub fn run_with(
        &self,
        calculators: Vec<Calculator>,
        layout: CubeLayout,
    ) -> Result<EngineOutput, EngineError> {
        let simulation = self.config.simulation();
        let samples = simulation.samples();
        let today = self.grid.today();
        let dates = self.grid.valuation_dates().to_vec();
        if calculators.is_empty() {
            return Err(EngineError::InvalidSetup("no calculators".to_string()));
        }

        info!(
            trades = self.portfolio.size(),
            dates = dates.len(),
            steps = self.grid.steps().len(),
            samples,
            depth = layout.trade_depth,
            mode = ?self.config.mpor_mode(),
            "Starting valuation run"
        );

        let trade_ids = self
            .portfolio
            .trades()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        let mut trades = NpvCube::new(
            today,
            trade_ids,
            dates.clone(),
            samples,
            layout.trade_depth,
        )?;
        let mut counterparties = if layout.counterparty_cube {
            let ids = counterparty_cube_ids(&self.portfolio);
            Some(NpvCube::new(today, ids, dates.clone(), samples, 2)?)
        } else {
            None
        };
        let mut netting_sets = if layout.netting_set_cube {
            let ids = self
                .portfolio
                .netting_sets()
                .iter()
                .map(|ns| ns.id().to_string())
                .collect();
            Some(NpvCube::new(today, ids, dates.clone(), samples, 1)?)
        } else {
            None
        };
        let mut scenario_ids = vec![NUMERAIRE_ID.to_string()];
        if self.grid.has_close_out() {
            scenario_ids.push(CLOSE_OUT_NUMERAIRE_ID.to_string());
        }
        let mut scenario_data = NpvCube::new(today, scenario_ids, dates, samples, 1)?;

        let generator = LgmPathGenerator::new(
            Arc::clone(self.market.model()),
            today,
            &self.grid.step_dates(),
            simulation.seed(),
        )?;

        let mut template = Worker {
            market: self.market.clone(),
            calculators,
            warned: false,
        };
        for calc in template.calculators.iter_mut() {
            calc.init(&self.portfolio, &template.market)?;
        }

        let failed: Vec<AtomicBool> = (0..self.portfolio.size())
            .map(|_| AtomicBool::new(false))
            .collect();
        let ctx = RunContext {
            portfolio: &self.portfolio,
            steps: self.grid.steps(),
            mode: self.config.mpor_mode(),
            failed: &failed,
        };

        {
            let mut t0 = T0Outputs {
                trades: &mut trades,
                counterparties: counterparties.as_mut(),
                netting_sets: netting_sets.as_mut(),
            };
            template.run_t0(&ctx, &mut t0, &mut scenario_data)?;
        }
        template.warned = false;

        let completed = AtomicUsize::new(0);
        {
            let mut cp_slices = counterparties.as_mut().map(|c| c.sample_slices_mut().into_iter());
            let mut ns_slices = netting_sets.as_mut().map(|c| c.sample_slices_mut().into_iter());
            let jobs: Vec<(SampleOutputs<'_>, SampleSliceMut<'_>)> = trades
                .sample_slices_mut()
                .into_iter()
                .zip(scenario_data.sample_slices_mut())
                .map(|(trade_slice, scenario_slice)| {
                    let outputs = SampleOutputs {
                        trades: trade_slice,
                        counterparties: cp_slices.as_mut().and_then(Iterator::next),
                        netting_sets: ns_slices.as_mut().and_then(Iterator::next),
                    };
                    (outputs, scenario_slice)
                })
                .collect();

            let cancel = &self.cancel;
            let work = || {
                jobs.into_par_iter().try_for_each_init(
                    || template.clone(),
                    |worker, (mut outputs, mut scenario_slice)| {
                        if cancel.load(Ordering::Relaxed) {
                            return Err(EngineError::Cancelled {
                                completed: completed.load(Ordering::Relaxed),
                            });
                        }
                        let sample = outputs.trades.sample();
                        let path = generator.path(sample);
                        worker.run_sample(&ctx, &path, &mut outputs, &mut scenario_slice)?;
                        completed.fetch_add(1, Ordering::Relaxed);
                        Ok(())
                    },
                )
            };

            let result = match simulation.threads() {
                Some(threads) => rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?
                    .install(work),
                None => work(),
            };
            if let Err(err) = result {
                return Err(match err {
                    EngineError::Cancelled { .. } => {
                        let completed = completed.load(Ordering::Relaxed);
                        warn!(completed, samples, "Valuation run cancelled");
                        EngineError::Cancelled { completed }
                    }
                    other => other,
                });
            }
        }

        let mut failed_trades = Vec::new();
        for (i, flag) in failed.iter().enumerate() {
            if flag.load(Ordering::Relaxed) {
                let trade = &self.portfolio.trades()[i];
                warn!(trade = %trade.id(), "Setting all cube cells to zero after valuation errors");
                trades.fill_id(i, 0.0)?;
                failed_trades.push(trade.id().clone());
            }
        }

        let survival_fallbacks = template
            .calculators
            .iter()
            .map(|c| match c {
                Calculator::SurvivalProbability(s) => s.fallback_count(),
                _ => 0,
            })
            .sum();

        info!(
            samples = completed.load(Ordering::Relaxed),
            failed = failed_trades.len(),
            survival_fallbacks,
            "Valuation run finished"
        );

        Ok(EngineOutput {
            trades,
            counterparties,
            netting_sets,
            scenario_data,
            layout,
            failed_trades,
            survival_fallbacks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::*;
    use crate::portfolio::{
        Counterparty, CounterpartyId, NettingSet, NettingSetId, PortfolioBuilder,
    };
    use approx::assert_relative_eq;
    use pricer_core::fixings::FixingStore;
    use pricer_core::types::{DayCountConvention, Tenor};
    use pricer_models::indices::InterestRateIndex;
    use pricer_models::instruments::{InterestRateSwap, SwapDirection, SwapTerms};
    use pricer_models::schedules::Frequency;

    fn grid(mpor: bool) -> DateGrid {
        let dates = vec![ymd(2024, 7, 1), ymd(2025, 1, 1), ymd(2026, 1, 1)];
        let g = DateGrid::new(today(), dates).unwrap();
        if mpor {
            g.with_mpor_days(14).unwrap()
        } else {
            g
        }
    }

    fn config(samples: usize, threads: usize) -> EngineConfigBuilder {
        EngineConfig::builder().simulation(
            SimulationConfig::builder()
                .samples(samples)
                .seed(11)
                .threads(threads)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_layout_slots() {
        let buckets = KeyRateBuckets::new(vec![1.0, 5.0]).unwrap();
        let cfg = config(1, 1).sensitivities(buckets).build().unwrap();
        let with_mpor = cfg.layout(&grid(true));
        assert_eq!(with_mpor.close_out, Some(1));
        assert_eq!(with_mpor.sensitivities, Some((2, 2)));
        assert_eq!(with_mpor.trade_depth, 4);
        let without = cfg.layout(&grid(false));
        assert_eq!(without.close_out, None);
        assert_eq!(without.sensitivities, Some((1, 2)));
        assert_eq!(without.trade_depth, 3);
        assert!(!without.netting_set_cube);
    }

    #[test]
    fn test_margin_requires_matching_buckets() {
        let var = ParametricVar::uniform(3, 100.0, 0.0, 0.99, 14).unwrap();
        assert!(matches!(
            config(1, 1).initial_margin(var.clone()).build(),
            Err(EngineError::InvalidSetup(_))
        ));
        let buckets = KeyRateBuckets::new(vec![1.0, 5.0]).unwrap();
        assert!(matches!(
            config(1, 1).sensitivities(buckets).initial_margin(var).build(),
            Err(EngineError::InvalidSetup(_))
        ));
        assert!(matches!(
            EngineConfig::builder().build(),
            Err(EngineError::Config(ConfigError::MissingParameter("simulation")))
        ));
    }

    #[test]
    fn test_full_run_fills_every_cube() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let buckets = KeyRateBuckets::new(vec![1.0, 5.0]).unwrap();
        let var = ParametricVar::uniform(2, 100.0, 0.3, 0.99, 14).unwrap();
        let cfg = config(4, 2)
            .sensitivities(buckets)
            .initial_margin(var)
            .survival(true)
            .build()
            .unwrap();
        let engine = ValuationEngine::new(portfolio, grid(true), market, cfg).unwrap();
        let out = engine.run().unwrap();

        assert!(out.failed_trades.is_empty());
        // CP_B has no curve: T0 plus every valuation date of every sample.
        assert_eq!(out.survival_fallbacks, 1 + 3 * 4);
        for sample in 0..4 {
            for date in 0..3 {
                for id in 0..3 {
                    for depth in 0..out.trades.depth() {
                        assert!(out.trades.is_written(id, date, sample, depth).unwrap());
                    }
                }
                let cp = out.counterparties.as_ref().unwrap();
                assert!(cp.get(0, date, sample, 0).unwrap() < 1.0);
                assert_eq!(cp.get(1, date, sample, 1).unwrap(), 1.0);
                let ns = out.netting_sets.as_ref().unwrap();
                assert!(ns.get(0, date, sample, 0).unwrap() >= 0.0);
                assert!(out.scenario_data.get(1, date, sample, 0).unwrap() > 0.0);
            }
        }
        assert_relative_eq!(out.scenario_data.get_t0(0, 0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_results_do_not_depend_on_thread_count() {
        let run = |threads| {
            let portfolio = portfolio();
            let market = market(&portfolio, 0.01);
            let engine = ValuationEngine::new(
                portfolio,
                grid(true),
                market,
                config(6, threads).build().unwrap(),
            )
            .unwrap();
            engine.run().unwrap().trades
        };
        let single = run(1);
        let multi = run(3);
        for sample in 0..6 {
            for date in 0..3 {
                for depth in 0..2 {
                    assert_eq!(
                        single.get(0, date, sample, depth).unwrap(),
                        multi.get(0, date, sample, depth).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_sticky_close_out_keeps_default_date_cash_flows() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.0);
        let engine = ValuationEngine::new(
            portfolio,
            grid(true),
            market,
            config(1, 1).build().unwrap(),
        )
        .unwrap();
        let out = engine.run().unwrap();
        // Zero volatility and a sticky date: the close-out market prices the
        // same cash flows off the same curve.
        let numeraire = out.scenario_data.get(0, 0, 0, 0).unwrap();
        let bond_default = out.trades.get(1, 0, 0, 0).unwrap() * numeraire;
        let bond_close_out = out.trades.get(1, 0, 0, 1).unwrap();
        assert_relative_eq!(bond_close_out, bond_default, epsilon = 1e-9);
    }

    #[test]
    fn test_cancelled_run() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let engine = ValuationEngine::new(
            portfolio,
            grid(false),
            market,
            config(8, 2).build().unwrap(),
        )
        .unwrap();
        engine.cancel_flag().store(true, Ordering::Relaxed);
        assert!(matches!(engine.run(), Err(EngineError::Cancelled { completed: 0 })));
    }

    #[test]
    fn test_failed_trade_is_zeroed() {
        let index = InterestRateIndex::new(
            "IDX-6M",
            Tenor::parse("6M").unwrap(),
            DayCountConvention::ActualActual365,
            0,
        );
        // First coupon fixed before today without a stored fixing.
        let seasoned = InterestRateSwap::new(SwapTerms {
            notional: 1_000_000.0,
            start: ymd(2023, 10, 2),
            maturity: ymd(2026, 10, 2),
            fixed_rate: 0.03,
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::ActualActual365,
            floating_frequency: Frequency::SemiAnnual,
            index,
            spread: 0.0,
            direction: SwapDirection::PayFixed,
        })
        .unwrap();
        let cp = CounterpartyId::new("CP_A");
        let portfolio = PortfolioBuilder::new()
            .add_counterparty(Counterparty::new(cp.clone(), "CURVE_A", 0.6).unwrap())
            .add_netting_set(NettingSet::new(NettingSetId::new("NS_A"), cp.clone()))
            .add_trade(bond_trade("BOND", "NS_A", "CP_A"))
            .add_trade(Trade::new(
                TradeId::new("SEASONED"),
                seasoned.into(),
                cp,
                NettingSetId::new("NS_A"),
            ))
            .build()
            .unwrap();
        let market = market(&portfolio, 0.01);
        let engine = ValuationEngine::new(
            portfolio,
            grid(false),
            market,
            config(2, 1).build().unwrap(),
        )
        .unwrap();
        let out = engine.run().unwrap();

        assert_eq!(out.failed_trades, vec![TradeId::new("SEASONED")]);
        assert_eq!(out.trades.get_t0(1, 0).unwrap(), 0.0);
        for sample in 0..2 {
            for date in 0..3 {
                assert_eq!(out.trades.get(1, date, sample, 0).unwrap(), 0.0);
                assert!(out.trades.get(0, date, sample, 0).unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn test_spot_start_without_todays_fixing_is_valued() {
        let portfolio = portfolio();
        let market = market_with_fixings(&portfolio, 0.01, FixingStore::new());
        let grid = DateGrid::new(today(), vec![ymd(2024, 3, 1), ymd(2025, 1, 1)]).unwrap();
        let engine = ValuationEngine::new(
            portfolio,
            grid,
            market,
            config(3, 1).build().unwrap(),
        )
        .unwrap();
        let out = engine.run().unwrap();

        assert!(out.failed_trades.is_empty());
        for sample in 0..3 {
            for date in 0..2 {
                let pay = out.trades.get(0, date, sample, 0).unwrap();
                let rec = out.trades.get(2, date, sample, 0).unwrap();
                assert!(pay != 0.0);
                assert_relative_eq!(pay, -rec, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_engine_rejects_mismatched_today() {
        let portfolio = portfolio();
        let market = market(&portfolio, 0.01);
        let other = DateGrid::new(ymd(2024, 2, 1), vec![ymd(2025, 1, 1)]).unwrap();
        assert!(matches!(
            ValuationEngine::new(portfolio, other, market, config(1, 1).build().unwrap()),
            Err(EngineError::InvalidSetup(_))
        ));
    }
}
