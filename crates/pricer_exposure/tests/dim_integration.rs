//! DIM calculators on cubes produced by the engine.

mod common;

use approx::assert_relative_eq;
use common::*;
use pricer_exposure::aggregation::{
    net_trade_values, DimCalculator, DirectDimCalculator, DynamicSimmCalculator,
};
use pricer_exposure::date_grid::DateGrid;
use pricer_exposure::engine::{EngineConfig, EngineOutput, ValuationEngine};
use pricer_exposure::margin::ParametricVar;
use pricer_exposure::portfolio::Portfolio;
use pricer_models::instruments::SwapDirection;
use pricer_simulation::market::KeyRateBuckets;

fn var() -> ParametricVar {
    ParametricVar::uniform(3, 90.0, 0.7, 0.99, 14).unwrap()
}

fn run(initial_margin: Option<f64>) -> (Portfolio, DateGrid, EngineOutput) {
    let trades = vec![swap("PAY", "NS", "CP", SwapDirection::PayFixed)];
    let portfolio = portfolio(trades, initial_margin);
    let dates = vec![ymd(2024, 1, 15), ymd(2024, 7, 1), ymd(2025, 1, 1)];
    let grid = DateGrid::new(today(), dates).unwrap();
    let config = EngineConfig::builder()
        .simulation(simulation(8, 2))
        .sensitivities(KeyRateBuckets::new(vec![1.0, 2.0, 5.0]).unwrap())
        .initial_margin(var())
        .build()
        .unwrap();
    let out = ValuationEngine::new(portfolio.clone(), grid.clone(), market(0.01), config)
        .unwrap()
        .run()
        .unwrap();
    (portfolio, grid, out)
}

fn direct<'a>(
    portfolio: &Portfolio,
    grid: &'a DateGrid,
    out: &'a EngineOutput,
) -> DirectDimCalculator<'a> {
    DirectDimCalculator::new(portfolio, grid, out.netting_sets.as_ref().unwrap()).unwrap()
}

fn simm<'a>(
    portfolio: &Portfolio,
    grid: &'a DateGrid,
    out: &'a EngineOutput,
) -> DynamicSimmCalculator<'a> {
    DynamicSimmCalculator::new(portfolio, &out.trades, &out.layout, grid, var()).unwrap()
}

#[test]
fn test_direct_dim_without_current_im_is_unscaled() {
    let (portfolio, grid, out) = run(None);
    let im = out.netting_sets.as_ref().unwrap();
    let calc = DirectDimCalculator::new(&portfolio, &grid, im).unwrap();
    let unscaled = calc.unscaled_current_dim().unwrap();
    let built = calc.build().unwrap();
    assert_eq!(unscaled["NS"], im.get_t0(0, 0).unwrap());
    assert_eq!(built["NS"].t0, unscaled["NS"]);
    for date in 0..3 {
        for sample in 0..8 {
            assert_eq!(built["NS"].values[date][sample], im.get(0, date, sample, 0).unwrap());
        }
    }
}

#[test]
fn test_scaled_t0_dim_matches_current_im() {
    let (portfolio, grid, out) = run(Some(1_000.0));
    let direct = direct(&portfolio, &grid, &out);
    assert_relative_eq!(direct.build().unwrap()["NS"].t0, 1_000.0, epsilon = 1e-9);

    let simm = simm(&portfolio, &grid, &out);
    assert_relative_eq!(simm.build().unwrap()["NS"].t0, 1_000.0, epsilon = 1e-9);
}

#[test]
fn test_simm_and_direct_dim_agree_on_same_var() {
    let (portfolio, grid, out) = run(None);
    let direct = direct(&portfolio, &grid, &out);
    let simm = simm(&portfolio, &grid, &out);
    let (a, b) = (direct.build().unwrap(), simm.build().unwrap());
    assert_relative_eq!(a["NS"].t0, b["NS"].t0, max_relative = 1e-12);
    for (x, y) in a["NS"].expected().iter().zip(b["NS"].expected()) {
        assert_relative_eq!(*x, y, max_relative = 1e-12);
    }
}

#[test]
fn test_dim_increases_with_quantile() {
    let (portfolio, grid, out) = run(None);
    let low = simm(&portfolio, &grid, &out);
    let high = low.with_quantile(0.995).unwrap();
    let (low, high) = (low.build().unwrap(), high.build().unwrap());
    assert!(high["NS"].t0 > low["NS"].t0);
    for (l, h) in low["NS"].expected().iter().zip(high["NS"].expected()) {
        assert!(h >= *l);
    }
}

#[test]
fn test_current_dim_estimate_is_positive() {
    let (portfolio, grid, out) = run(None);
    let netted = net_trade_values(&portfolio, &out.trades, &out.layout).unwrap();
    let simm = simm(&portfolio, &grid, &out);
    let current = simm.current_dim(&netted).unwrap();
    assert!(current["NS"] > 0.0);
}
