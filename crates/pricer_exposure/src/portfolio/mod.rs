//! Portfolio, trades, counterparties and netting sets.
//!
//! Trades keep the order they were added in: that order is the trade axis
//! of the exposure cube. Counterparties and netting sets are kept in
//! insertion order too, so cube ids and reports are stable across runs.
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::Date;
//! use pricer_exposure::portfolio::{
//!     Counterparty, CounterpartyId, NettingSet, NettingSetId, PortfolioBuilder, Trade, TradeId,
//! };
//! use pricer_models::instruments::ZeroCouponBond;
//!
//! let cpty = CounterpartyId::new("CPTY_A");
//! let bond = ZeroCouponBond::new(100.0, Date::from_ymd(2027, 6, 30).unwrap(), true).unwrap();
//!
//! let portfolio = PortfolioBuilder::new()
//!     .add_counterparty(Counterparty::new(cpty.clone(), "CPTY_A", 0.6).unwrap())
//!     .add_netting_set(NettingSet::new(NettingSetId::new("NS_A"), cpty.clone()))
//!     .add_trade(Trade::new(TradeId::new("T1"), bond.into(), cpty, NettingSetId::new("NS_A")))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(portfolio.size(), 1);
//! assert_eq!(portfolio.trade_index(&TradeId::new("T1")), Some(0));
//! ```

mod builder;
mod counterparty;
mod error;
mod ids;
mod netting_set;
mod trade;

pub use builder::PortfolioBuilder;
pub use counterparty::Counterparty;
pub use error::{EntityKind, PortfolioError};
pub use ids::{CounterpartyId, NettingSetId, TradeId};
pub use netting_set::NettingSet;
pub use trade::Trade;

use pricer_core::types::Date;
use pricer_models::indices::InterestRateIndex;
use pricer_simulation::fixings::FixingRequirements;
use std::collections::{BTreeMap, HashMap};

/// Validated, ordered portfolio.
#[derive(Debug, Clone)]
pub struct Portfolio {
    trades: Vec<Trade>,
    trade_index: HashMap<TradeId, usize>,
    counterparties: Vec<Counterparty>,
    counterparty_index: HashMap<CounterpartyId, usize>,
    netting_sets: Vec<NettingSet>,
    netting_set_index: HashMap<NettingSetId, usize>,
    own_party: Option<Counterparty>,
}

impl Portfolio {
    /// Number of trades.
    #[inline]
    pub fn size(&self) -> usize {
        self.trades.len()
    }

    /// Returns whether the portfolio has no trades.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Trades in cube order.
    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Gets a trade by ID.
    pub fn trade(&self, id: &TradeId) -> Option<&Trade> {
        self.trade_index.get(id).map(|&i| &self.trades[i])
    }

    /// Position of a trade on the cube's trade axis.
    #[inline]
    pub fn trade_index(&self, id: &TradeId) -> Option<usize> {
        self.trade_index.get(id).copied()
    }

    /// Counterparties in insertion order.
    #[inline]
    pub fn counterparties(&self) -> &[Counterparty] {
        &self.counterparties
    }

    /// Gets a counterparty by ID.
    pub fn counterparty(&self, id: &CounterpartyId) -> Option<&Counterparty> {
        self.counterparty_index.get(id).map(|&i| &self.counterparties[i])
    }

    /// The own party, when credit on our side is modelled.
    #[inline]
    pub fn own_party(&self) -> Option<&Counterparty> {
        self.own_party.as_ref()
    }

    /// Netting sets in insertion order.
    #[inline]
    pub fn netting_sets(&self) -> &[NettingSet] {
        &self.netting_sets
    }

    /// Gets a netting set by ID.
    pub fn netting_set(&self, id: &NettingSetId) -> Option<&NettingSet> {
        self.netting_set_index.get(id).map(|&i| &self.netting_sets[i])
    }

    /// Position of a netting set in [`Portfolio::netting_sets`].
    #[inline]
    pub fn netting_set_index(&self, id: &NettingSetId) -> Option<usize> {
        self.netting_set_index.get(id).copied()
    }

    /// Trade positions grouped by netting set, in netting set order.
    pub fn netting_set_members(&self) -> Vec<Vec<usize>> {
        self.netting_sets
            .iter()
            .map(|ns| {
                ns.trade_ids()
                    .iter()
                    .filter_map(|id| self.trade_index(id))
                    .collect()
            })
            .collect()
    }

    /// Trade ID to netting set ID, as consumed by the cube writer.
    pub fn netting_set_map(&self) -> BTreeMap<String, String> {
        self.trades
            .iter()
            .map(|t| (t.id().to_string(), t.netting_set_id().to_string()))
            .collect()
    }

    /// Sum of trade notionals.
    pub fn total_notional(&self) -> f64 {
        self.trades.iter().map(Trade::notional).sum()
    }

    /// Latest trade maturity.
    pub fn maturity(&self) -> Option<Date> {
        self.trades.iter().map(Trade::maturity).max()
    }
}

impl FixingRequirements for Portfolio {
    fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)> {
        self.trades
            .iter()
            .flat_map(|t| t.instrument().fixing_requirements())
            .collect()
    }
}
