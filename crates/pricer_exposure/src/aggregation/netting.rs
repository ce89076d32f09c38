//! Netting-set aggregation of trade values.

use super::AggregationError;
use crate::cube::NpvCube;
use crate::engine::CubeLayout;
use crate::portfolio::Portfolio;
use tracing::debug;

/// Sums trade values per netting set.
///
/// The result has one id per netting set and depth 1 (default values) or 2
/// (default and close-out values) depending on `layout`. Its T0 close-out
/// slot repeats the T0 default value.
///
/// # Errors
///
/// `Mismatch` if the trade cube ids differ from the portfolio trades.
pub fn net_trade_values(
    portfolio: &Portfolio,
    trades: &NpvCube,
    layout: &CubeLayout,
) -> Result<NpvCube, AggregationError> {
    let matches = trades.num_ids() == portfolio.size()
        && portfolio
            .trades()
            .iter()
            .zip(trades.ids())
            .all(|(t, id)| t.id().as_str() == id);
    if !matches {
        return Err(AggregationError::Mismatch(
            "trade cube ids differ from portfolio trades".to_string(),
        ));
    }

    let members = portfolio.netting_set_members();
    let ids = portfolio
        .netting_sets()
        .iter()
        .map(|ns| ns.id().to_string())
        .collect();
    let slots: Vec<usize> = std::iter::once(layout.npv).chain(layout.close_out).collect();
    let mut netted = NpvCube::new(
        trades.asof(),
        ids,
        trades.dates().to_vec(),
        trades.samples(),
        slots.len(),
    )?;

    for (n, trade_indices) in members.iter().enumerate() {
        let mut t0 = 0.0;
        for &t in trade_indices {
            t0 += trades.get_t0(t, layout.npv)?;
        }
        for depth in 0..slots.len() {
            netted.set_t0(t0, n, depth)?;
        }
    }

    for sample in 0..trades.samples() {
        for date in 0..trades.num_dates() {
            for (n, trade_indices) in members.iter().enumerate() {
                for (depth, &slot) in slots.iter().enumerate() {
                    let mut value = 0.0;
                    for &t in trade_indices {
                        value += trades.get(t, date, sample, slot)?;
                    }
                    netted.set(value, n, date, sample, depth)?;
                }
            }
        }
    }
    debug!(netting_sets = members.len(), depth = slots.len(), "Netted trade values");
    Ok(netted)
}
