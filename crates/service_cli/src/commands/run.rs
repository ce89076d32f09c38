//! Run command implementation
//!
//! Simulates the configured portfolio, aggregates the cubes and writes the
//! exports into the output directory:
//!
//! | File | Content |
//! |------|---------|
//! | `cube.csv` | trade cube, all depths |
//! | `scenariodata.csv` | numeraire per valuation and close-out step |
//! | `netting_set_im.csv` | netting-set IM cube (with a margin model) |
//! | `exposure.csv` | EE, ENE and PFE profiles per netting set |
//! | `dim_evolution.csv` | expected DIM through time (with a margin model) |
//! | `summary.json` | run parameters, failures, CVA and DIM at t0 |

use super::{load_config, Overrides};
use crate::config::RunConfig;
use crate::error::Result;
use crate::setup::RunSetup;
use pricer_exposure::aggregation::{
    cva_by_netting_set, export_exposure_profiles, exposure_profiles, net_trade_values,
    DimCalculator, DirectDimCalculator, DynamicSimmCalculator,
};
use pricer_exposure::engine::{EngineOutput, MporMode, ValuationEngine};
use pricer_exposure::output::CubeWriter;
use pricer_exposure::report::CsvReport;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CVA of one netting set.
#[derive(Debug, Clone, Serialize)]
pub struct CvaEntry {
    /// Netting set id.
    pub netting_set: String,
    /// Counterparty id.
    pub counterparty: String,
    /// Loss given default.
    pub lgd: f64,
    /// Unilateral CVA in deflated units.
    pub cva: f64,
}

/// DIM figures of one netting set.
#[derive(Debug, Clone, Serialize)]
pub struct DimEntry {
    /// Scaled model DIM today.
    pub t0: f64,
    /// Model DIM today before scaling.
    pub unscaled_t0: f64,
    /// Scaling factor applied.
    pub scaling: f64,
    /// Estimate from the simulated value spread at the margin horizon.
    pub simulated_estimate: f64,
}

/// Written as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// As-of date.
    pub asof: String,
    /// Samples simulated.
    pub samples: usize,
    /// Base seed.
    pub seed: u64,
    /// Valuation dates.
    pub dates: usize,
    /// Close-out market mode, when the grid has close-out dates.
    pub mpor_mode: Option<String>,
    /// Trades in the portfolio.
    pub trades: usize,
    /// Trades zeroed after a pricing failure.
    pub failed_trades: Vec<String>,
    /// Survival probabilities that fell back to 1.
    pub survival_fallbacks: usize,
    /// CVA per netting set.
    pub cva: Vec<CvaEntry>,
    /// DIM per netting set.
    pub dim: BTreeMap<String, DimEntry>,
    /// Wall time of the simulation in seconds.
    pub simulation_seconds: f64,
}

/// Run the run command
pub fn run(config_path: &Path, overrides: &Overrides) -> Result<RunSummary> {
    let config = load_config(config_path, overrides)?;
    execute(&config)
}

/// Runs a validated configuration.
pub fn execute(config: &RunConfig) -> Result<RunSummary> {
    let setup = RunSetup::build(config)?;
    let RunSetup {
        asof,
        portfolio,
        grid,
        market,
        engine,
        margin,
    } = setup;
    let samples = engine.simulation().samples();
    let seed = engine.simulation().seed();
    let mode = engine.mpor_mode();

    let started = Instant::now();
    let engine = ValuationEngine::new(portfolio, grid, market, engine)?;
    let output = engine.run()?;
    let simulation_seconds = started.elapsed().as_secs_f64();
    let (portfolio, grid) = (engine.portfolio(), engine.grid());

    let dir = &config.output_dir;
    fs::create_dir_all(dir)?;
    write_cubes(dir, portfolio, &output)?;

    let netted = net_trade_values(portfolio, &output.trades, &output.layout)?;
    let profiles = exposure_profiles(&netted, config.confidence)?;
    export_exposure_profiles(&profiles, &mut CsvReport::create(dir.join("exposure.csv"))?)?;

    let cva = match &output.counterparties {
        Some(cube) => cva_by_netting_set(portfolio, &profiles, cube)?
            .into_iter()
            .map(|c| CvaEntry {
                netting_set: c.netting_set,
                counterparty: c.counterparty,
                lgd: c.lgd,
                cva: c.cva,
            })
            .collect(),
        None => Vec::new(),
    };

    let mut dim = BTreeMap::new();
    if let (Some(var), Some(im_cube)) = (margin, &output.netting_sets) {
        let direct = DirectDimCalculator::new(portfolio, grid, im_cube)?;
        direct.export_dim_evolution(&mut CsvReport::create(dir.join("dim_evolution.csv"))?)?;
        let unscaled = direct.unscaled_current_dim()?;
        let simm = DynamicSimmCalculator::new(
            portfolio,
            &output.trades,
            &output.layout,
            grid,
            var,
        )?;
        let estimates = simm.current_dim(&netted)?;
        for (n, id) in direct.netting_set_ids().iter().enumerate() {
            let scaling = direct.scaling(n);
            let unscaled_t0 = unscaled.get(id).copied().unwrap_or(0.0);
            dim.insert(
                id.clone(),
                DimEntry {
                    t0: scaling.apply(unscaled_t0),
                    unscaled_t0,
                    scaling: scaling.factor(),
                    simulated_estimate: estimates.get(id).copied().unwrap_or(0.0),
                },
            );
        }
    }

    let summary = RunSummary {
        asof: asof.to_string(),
        samples,
        seed,
        dates: grid.len(),
        mpor_mode: grid.has_close_out().then(|| {
            match mode {
                MporMode::StickyDate => "sticky",
                MporMode::ActualDate => "actual",
            }
            .to_string()
        }),
        trades: portfolio.size(),
        failed_trades: output.failed_trades.iter().map(|t| t.to_string()).collect(),
        survival_fallbacks: output.survival_fallbacks,
        cva,
        dim,
        simulation_seconds,
    };
    let file = BufWriter::new(File::create(dir.join("summary.json"))?);
    serde_json::to_writer_pretty(file, &summary)?;
    info!(
        output_dir = %dir.display(),
        failed = summary.failed_trades.len(),
        seconds = simulation_seconds,
        "Run complete"
    );
    Ok(summary)
}

fn write_cubes(
    dir: &Path,
    portfolio: &pricer_exposure::portfolio::Portfolio,
    output: &EngineOutput,
) -> Result<()> {
    CubeWriter::new(dir.join("cube.csv")).write(
        &output.trades,
        &portfolio.netting_set_map(),
        false,
    )?;

    let scenario_ids: BTreeMap<String, String> = output
        .scenario_data
        .ids()
        .iter()
        .map(|id| (id.clone(), String::new()))
        .collect();
    CubeWriter::new(dir.join("scenariodata.csv")).write(
        &output.scenario_data,
        &scenario_ids,
        false,
    )?;

    if let Some(im) = &output.netting_sets {
        let own: BTreeMap<String, String> = im.ids().iter().map(
            |id| (id.clone(), id.clone()),
        )
        .collect();
        CubeWriter::new(dir.join("netting_set_im.csv")).write(im, &own, false)?;
    }
    Ok(())
}
