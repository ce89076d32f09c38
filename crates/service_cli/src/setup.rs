//! Engine inputs built from a validated [`RunConfig`].

use crate::config::{CounterpartyConfig, DirectionConfig, MporModeConfig, ProductConfig, RunConfig};
use crate::error::{CliError, Result};
use pricer_core::fixings::FixingStore;
use pricer_core::market_data::curves::{CurveEnum, FlatHazardRateCurve};
use pricer_core::types::{Date, DayCountConvention, Tenor};
use pricer_exposure::date_grid::DateGrid;
use pricer_exposure::engine::{EngineConfig, MporMode};
use pricer_exposure::margin::ParametricVar;
use pricer_exposure::portfolio::{
    Counterparty, CounterpartyId, NettingSet, NettingSetId, Portfolio, PortfolioBuilder, Trade,
    TradeId,
};
use pricer_models::indices::InterestRateIndex;
use pricer_models::instruments::{
    Instrument, InterestRateSwap, SwapDirection, SwapTerms, ZeroCouponBond,
};
use pricer_models::models::LgmModel;
use pricer_models::schedules::Frequency;
use pricer_simulation::fixings::FixingManager;
use pricer_simulation::market::{KeyRateBuckets, ScenarioSimMarket};
use pricer_simulation::SimulationConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Everything the engine needs for one run.
#[derive(Debug)]
pub struct RunSetup {
    /// As-of date.
    pub asof: Date,
    /// Portfolio.
    pub portfolio: Portfolio,
    /// Valuation and close-out dates.
    pub grid: DateGrid,
    /// Simulated market positioned on the as-of date.
    pub market: ScenarioSimMarket,
    /// Engine configuration.
    pub engine: EngineConfig,
    /// Margin model, when DIM is requested.
    pub margin: Option<ParametricVar>,
}

impl RunSetup {
    /// Builds the run inputs; `config` must have passed validation.
    pub fn build(config: &RunConfig) -> Result<Self> {
        let asof = date(&config.asof)?;
        let indices = indices(config)?;
        let portfolio = portfolio(config, &indices)?;
        let grid = grid(config, asof)?;
        let market = market(config, asof)?;
        let margin = config
            .margin
            .as_ref()
            .map(|m| {
                ParametricVar::uniform(
                    m.buckets.len(),
                    m.volatility,
                    m.correlation,
                    m.quantile,
                    m.holding_days,
                )
                .map_err(CliError::setup)
            })
            .transpose()?;

        let mut simulation = SimulationConfig::builder()
            .samples(config.simulation.samples)
            .seed(config.simulation.seed);
        if let Some(threads) = config.simulation.threads {
            simulation = simulation.threads(threads);
        }
        let mut engine = EngineConfig::builder()
            .simulation(simulation.build().map_err(CliError::setup)?)
            .mpor_mode(match config.grid.mpor_mode {
                MporModeConfig::Sticky => MporMode::StickyDate,
                MporModeConfig::Actual => MporMode::ActualDate,
            })
            .survival(true);
        if let (Some(section), Some(var)) = (&config.margin, &margin) {
            let buckets = KeyRateBuckets::new(section.buckets.clone()).map_err(CliError::setup)?;
            engine = engine.sensitivities(buckets).initial_margin(var.clone());
        }

        debug!(trades = portfolio.size(), dates = grid.len(), "Run set up");
        Ok(Self {
            asof,
            portfolio,
            grid,
            market,
            engine: engine.build()?,
            margin,
        })
    }
}

fn date(value: &str) -> Result<Date> {
    Date::parse(value).map_err(CliError::setup)
}

fn indices(config: &RunConfig) -> Result<BTreeMap<String, InterestRateIndex>> {
    config
        .indices
        .iter()
        .map(|i| {
            let tenor = Tenor::parse(&i.tenor).map_err(CliError::setup)?;
            let day_count: DayCountConvention = i.day_count.parse().map_err(CliError::setup)?;
            Ok((
                i.name.clone(),
                InterestRateIndex::new(i.name.as_str(), tenor, day_count, i.fixing_days),
            ))
        })
        .collect()
}

fn counterparty(config: &CounterpartyConfig) -> Result<Counterparty> {
    Counterparty::new(
        CounterpartyId::new(config.id.as_str()),
        config.id.as_str(),
        config.lgd,
    )
    .map_err(CliError::setup)
}

fn instrument(
    product: &ProductConfig,
    indices: &BTreeMap<String, InterestRateIndex>,
) -> Result<Instrument> {
    let instrument = match product {
        ProductConfig::Swap {
            notional,
            start,
            maturity,
            fixed_rate,
            direction,
            index,
            fixed_frequency,
            fixed_day_count,
            floating_frequency,
            spread,
        } => {
            let index = indices
                .get(index)
                .cloned()
                .ok_or_else(|| CliError::setup(format!("unknown index {}", index)))?;
            InterestRateSwap::new(SwapTerms {
                notional: *notional,
                start: date(start)?,
                maturity: date(maturity)?,
                fixed_rate: *fixed_rate,
                fixed_frequency: fixed_frequency.parse::<Frequency>().map_err(CliError::setup)?,
                fixed_day_count: fixed_day_count.parse().map_err(CliError::setup)?,
                floating_frequency: floating_frequency
                    .parse::<Frequency>()
                    .map_err(CliError::setup)?,
                index,
                spread: *spread,
                direction: match direction {
                    DirectionConfig::Payer => SwapDirection::PayFixed,
                    DirectionConfig::Receiver => SwapDirection::ReceiveFixed,
                },
            })
            .map_err(CliError::setup)?
            .into()
        }
        ProductConfig::Bond {
            notional,
            maturity,
            long,
        } => ZeroCouponBond::new(*notional, date(maturity)?, *long)
            .map_err(CliError::setup)?
            .into(),
    };
    Ok(instrument)
}

fn portfolio(
    config: &RunConfig,
    indices: &BTreeMap<String, InterestRateIndex>,
) -> Result<Portfolio> {
    let mut builder = PortfolioBuilder::new();
    for cp in &config.counterparties {
        builder = builder.add_counterparty(counterparty(cp)?);
    }
    if let Some(own) = &config.own_party {
        builder = builder.own_party(counterparty(own)?);
    }
    let mut owners = BTreeMap::new();
    for ns in &config.netting_sets {
        let mut netting_set = NettingSet::new(
            NettingSetId::new(ns.id.as_str()),
            CounterpartyId::new(ns.counterparty.as_str()),
        );
        if let Some(im) = ns.initial_margin {
            netting_set = netting_set.with_initial_margin(im);
        }
        owners.insert(ns.id.as_str(), ns.counterparty.as_str());
        builder = builder.add_netting_set(netting_set);
    }
    for trade in &config.trades {
        let owner = owners
            .get(trade.netting_set.as_str())
            .ok_or_else(|| CliError::setup(format!("unknown netting set {}", trade.netting_set)))?;
        builder = builder.add_trade(Trade::new(
            TradeId::new(trade.id.as_str()),
            instrument(&trade.product, indices)?,
            CounterpartyId::new(*owner),
            NettingSetId::new(trade.netting_set.as_str()),
        ));
    }
    builder.build().map_err(CliError::setup)
}

fn grid(config: &RunConfig, asof: Date) -> Result<DateGrid> {
    let tenors = config
        .grid
        .tenors
        .iter()
        .map(|t| Tenor::parse(t))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(CliError::setup)?;
    let grid = DateGrid::from_tenors(asof, &tenors).map_err(CliError::setup)?;
    match config.grid.mpor_days {
        Some(days) => grid.with_mpor_days(days).map_err(CliError::setup),
        None => Ok(grid),
    }
}

fn market(config: &RunConfig, asof: Date) -> Result<ScenarioSimMarket> {
    let model = LgmModel::new(
        config.model.mean_reversion,
        config.model.volatility,
        CurveEnum::flat(config.model.flat_rate),
    )
    .map_err(CliError::setup)?;

    let mut curves = BTreeMap::new();
    for cp in config.counterparties.iter().chain(config.own_party.as_ref()) {
        if let Some(hazard) = cp.hazard_rate {
            let curve = FlatHazardRateCurve::new(hazard).map_err(CliError::setup)?;
            curves.insert(cp.id.clone(), curve.into());
        }
    }

    let mut store = FixingStore::new();
    for fixing in &config.fixings {
        store.add_fixing(&fixing.index, date(&fixing.date)?, fixing.value);
    }
    ScenarioSimMarket::new(Arc::new(model), Arc::new(curves), asof, FixingManager::new(asof, store))
        .map_err(CliError::setup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SAMPLE_CONFIG;
    use pricer_simulation::market::SimMarket;

    #[test]
    fn test_sample_config_builds() {
        let config = RunConfig::from_toml(SAMPLE_CONFIG).unwrap();
        let setup = RunSetup::build(&config).unwrap();
        assert_eq!(setup.portfolio.size(), 3);
        assert_eq!(setup.portfolio.netting_sets().len(), 2);
        assert_eq!(setup.grid.len(), 7);
        assert!(setup.grid.has_close_out());
        assert_eq!(setup.engine.mpor_mode(), MporMode::StickyDate);
        assert_eq!(setup.margin.as_ref().map(|v| v.buckets()), Some(4));
        let ns = setup.portfolio.netting_set(&NettingSetId::new("NS_BANK_A")).unwrap();
        assert_eq!(ns.initial_margin(), Some(250_000.0));
    }

    #[test]
    fn test_counterparty_without_hazard_rate_has_no_curve() {
        let mut config = RunConfig::from_toml(SAMPLE_CONFIG).unwrap();
        config.counterparties[1].hazard_rate = None;
        let setup = RunSetup::build(&config).unwrap();
        let date = setup.asof.add_days(30).unwrap();
        assert!(setup.market.survival_probability("CORP_B", date).is_err());
        assert!(setup.market.survival_probability("BANK_A", date).is_ok());
    }
}
