//! Netting sets.

use super::ids::{CounterpartyId, NettingSetId, TradeId};

/// Trades with one counterparty whose values net on default.
///
/// Membership is derived from the trades by the portfolio builder; the
/// optional `initial_margin` is the actual IM posted today, used to scale
/// simulated IM.
#[derive(Clone, Debug, PartialEq)]
pub struct NettingSet {
    id: NettingSetId,
    counterparty_id: CounterpartyId,
    initial_margin: Option<f64>,
    trade_ids: Vec<TradeId>,
}

impl NettingSet {
    /// Creates an empty netting set.
    pub fn new(id: NettingSetId, counterparty_id: CounterpartyId) -> Self {
        Self {
            id,
            counterparty_id,
            initial_margin: None,
            trade_ids: Vec::new(),
        }
    }

    /// Sets today's actual initial margin.
    pub fn with_initial_margin(mut self, amount: f64) -> Self {
        self.initial_margin = Some(amount);
        self
    }

    /// Returns the netting set ID.
    #[inline]
    pub fn id(&self) -> &NettingSetId {
        &self.id
    }

    /// Returns the counterparty ID.
    #[inline]
    pub fn counterparty_id(&self) -> &CounterpartyId {
        &self.counterparty_id
    }

    /// Today's actual initial margin, if known.
    #[inline]
    pub fn initial_margin(&self) -> Option<f64> {
        self.initial_margin
    }

    /// Member trades in portfolio order.
    #[inline]
    pub fn trade_ids(&self) -> &[TradeId] {
        &self.trade_ids
    }

    pub(crate) fn push_trade(&mut self, id: TradeId) {
        self.trade_ids.push(id);
    }
}
