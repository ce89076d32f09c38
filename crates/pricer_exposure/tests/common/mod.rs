//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use pricer_core::fixings::FixingStore;
use pricer_core::market_data::curves::{CurveEnum, FlatHazardRateCurve};
use pricer_core::types::{Date, DayCountConvention, Tenor};
use pricer_exposure::engine::EngineConfig;
use pricer_exposure::portfolio::{
    Counterparty, CounterpartyId, NettingSet, NettingSetId, Portfolio, PortfolioBuilder, Trade,
    TradeId,
};
use pricer_models::indices::InterestRateIndex;
use pricer_models::instruments::{InterestRateSwap, SwapDirection, SwapTerms, ZeroCouponBond};
use pricer_models::models::LgmModel;
use pricer_models::schedules::Frequency;
use pricer_simulation::fixings::FixingManager;
use pricer_simulation::market::ScenarioSimMarket;
use pricer_simulation::SimulationConfig;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const RATE: f64 = 0.03;

pub fn ymd(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

pub fn today() -> Date {
    ymd(2024, 1, 1)
}

pub fn bond(id: &str, ns: &str, cp: &str, maturity: Date) -> Trade {
    let bond = ZeroCouponBond::new(100.0, maturity, true).unwrap();
    Trade::new(TradeId::new(id), bond.into(), CounterpartyId::new(cp), NettingSetId::new(ns))
}

pub fn swap(id: &str, ns: &str, cp: &str, direction: SwapDirection) -> Trade {
    let index = InterestRateIndex::new(
        "IDX-6M",
        Tenor::parse("6M").unwrap(),
        DayCountConvention::ActualActual365,
        0,
    );
    let swap = InterestRateSwap::new(SwapTerms {
        notional: 1_000_000.0,
        start: today(),
        maturity: ymd(2027, 1, 1),
        fixed_rate: RATE,
        fixed_frequency: Frequency::Annual,
        fixed_day_count: DayCountConvention::ActualActual365,
        floating_frequency: Frequency::SemiAnnual,
        index,
        spread: 0.0,
        direction,
    })
    .unwrap();
    Trade::new(TradeId::new(id), swap.into(), CounterpartyId::new(cp), NettingSetId::new(ns))
}

/// One counterparty with a single netting set holding `trades`.
pub fn portfolio(trades: Vec<Trade>, initial_margin: Option<f64>) -> Portfolio {
    let cp = CounterpartyId::new("CP");
    let mut ns = NettingSet::new(NettingSetId::new("NS"), cp.clone());
    if let Some(im) = initial_margin {
        ns = ns.with_initial_margin(im);
    }
    PortfolioBuilder::new()
        .add_counterparty(Counterparty::new(cp, "CP_CURVE", 0.6).unwrap())
        .add_netting_set(ns)
        .add_trades(trades)
        .build()
        .unwrap()
}

pub fn market(volatility: f64) -> ScenarioSimMarket {
    let model = Arc::new(LgmModel::new(0.03, volatility, CurveEnum::flat(RATE)).unwrap());
    let mut curves = BTreeMap::new();
    curves.insert("CP_CURVE".to_string(), FlatHazardRateCurve::new(0.02).unwrap().into());
    let mut store = FixingStore::new();
    store.add_fixing("IDX-6M", today(), RATE);
    ScenarioSimMarket::new(
        model,
        Arc::new(curves),
        today(),
        FixingManager::new(today(), store),
    )
    .unwrap()
}

pub fn simulation(samples: usize, threads: usize) -> SimulationConfig {
    SimulationConfig::builder()
        .samples(samples)
        .seed(42)
        .threads(threads)
        .build()
        .unwrap()
}

pub fn config(samples: usize) -> EngineConfig {
    EngineConfig::builder().simulation(simulation(samples, 1)).build().unwrap()
}
