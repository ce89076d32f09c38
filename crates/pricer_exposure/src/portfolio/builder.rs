//! Portfolio builder with reference validation.

use std::collections::HashMap;

use super::counterparty::Counterparty;
use super::error::{EntityKind, PortfolioError};
use super::netting_set::NettingSet;
use super::trade::Trade;
use super::Portfolio;

/// Collects trades, counterparties and netting sets and validates all
/// references on [`PortfolioBuilder::build`].
#[derive(Default)]
pub struct PortfolioBuilder {
    trades: Vec<Trade>,
    counterparties: Vec<Counterparty>,
    netting_sets: Vec<NettingSet>,
    own_party: Option<Counterparty>,
}

impl PortfolioBuilder {
    /// Creates a new portfolio builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trade.
    pub fn add_trade(mut self, trade: Trade) -> Self {
        self.trades.push(trade);
        self
    }

    /// Adds several trades.
    pub fn add_trades(mut self, trades: impl IntoIterator<Item = Trade>) -> Self {
        self.trades.extend(trades);
        self
    }

    /// Adds a counterparty.
    pub fn add_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparties.push(counterparty);
        self
    }

    /// Adds a netting set.
    pub fn add_netting_set(mut self, netting_set: NettingSet) -> Self {
        self.netting_sets.push(netting_set);
        self
    }

    /// Sets the own party.
    pub fn own_party(mut self, party: Counterparty) -> Self {
        self.own_party = Some(party);
        self
    }

    /// Builds and validates the portfolio.
    ///
    /// # Validation
    ///
    /// - At least one trade
    /// - No duplicate trade, counterparty or netting set IDs
    /// - Every trade references a known counterparty and netting set, and
    ///   both agree on the counterparty
    /// - Every netting set references a known counterparty
    pub fn build(self) -> Result<Portfolio, PortfolioError> {
        if self.trades.is_empty() {
            return Err(PortfolioError::EmptyPortfolio);
        }

        let mut counterparty_index = HashMap::new();
        for (i, cp) in self.counterparties.iter().enumerate() {
            if counterparty_index.insert(cp.id().clone(), i).is_some() {
                return Err(PortfolioError::duplicate(EntityKind::Counterparty, cp.id()));
            }
        }
        if let Some(own) = &self.own_party {
            if counterparty_index.contains_key(own.id()) {
                return Err(PortfolioError::duplicate(EntityKind::Counterparty, own.id()));
            }
        }

        let mut netting_set_index = HashMap::new();
        for (i, ns) in self.netting_sets.iter().enumerate() {
            if !counterparty_index.contains_key(ns.counterparty_id()) {
                return Err(PortfolioError::UnknownCounterparty {
                    owner: format!("netting set '{}'", ns.id()),
                    counterparty: ns.counterparty_id().to_string(),
                });
            }
            if netting_set_index.insert(ns.id().clone(), i).is_some() {
                return Err(PortfolioError::duplicate(EntityKind::NettingSet, ns.id()));
            }
        }

        let mut netting_sets = self.netting_sets;
        let mut trade_index = HashMap::new();
        for (i, trade) in self.trades.iter().enumerate() {
            if trade_index.insert(trade.id().clone(), i).is_some() {
                return Err(PortfolioError::duplicate(EntityKind::Trade, trade.id()));
            }
            if !counterparty_index.contains_key(trade.counterparty_id()) {
                return Err(PortfolioError::UnknownCounterparty {
                    owner: format!("trade '{}'", trade.id()),
                    counterparty: trade.counterparty_id().to_string(),
                });
            }
            let Some(&ns_pos) = netting_set_index.get(trade.netting_set_id()) else {
                return Err(PortfolioError::UnknownNettingSet {
                    trade: trade.id().to_string(),
                    netting_set: trade.netting_set_id().to_string(),
                });
            };
            let ns = &mut netting_sets[ns_pos];
            if ns.counterparty_id() != trade.counterparty_id() {
                return Err(PortfolioError::CounterpartyMismatch {
                    trade: trade.id().to_string(),
                    trade_counterparty: trade.counterparty_id().to_string(),
                    netting_set_counterparty: ns.counterparty_id().to_string(),
                });
            }
            ns.push_trade(trade.id().clone());
        }

        Ok(Portfolio {
            trades: self.trades,
            trade_index,
            counterparties: self.counterparties,
            counterparty_index,
            netting_sets,
            netting_set_index,
            own_party: self.own_party,
        })
    }
}
