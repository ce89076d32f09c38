//! Trades: an instrument with its booking metadata.

use pricer_core::types::Date;
use pricer_models::indices::InterestRateIndex;
use pricer_models::instruments::Instrument;
use pricer_simulation::fixings::FixingRequirements;

use super::ids::{CounterpartyId, NettingSetId, TradeId};

/// A booked instrument.
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_exposure::portfolio::{CounterpartyId, NettingSetId, Trade, TradeId};
/// use pricer_models::instruments::ZeroCouponBond;
///
/// let bond = ZeroCouponBond::new(1_000_000.0, Date::from_ymd(2029, 1, 1).unwrap(), true).unwrap();
/// let trade = Trade::new(
///     TradeId::new("ZCB_1"),
///     bond.into(),
///     CounterpartyId::new("CPTY_A"),
///     NettingSetId::new("NS_A"),
/// );
/// assert_eq!(trade.notional(), 1_000_000.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Trade {
    id: TradeId,
    instrument: Instrument,
    counterparty_id: CounterpartyId,
    netting_set_id: NettingSetId,
}

impl Trade {
    /// Creates a new trade.
    #[inline]
    pub fn new(
        id: TradeId,
        instrument: Instrument,
        counterparty_id: CounterpartyId,
        netting_set_id: NettingSetId,
    ) -> Self {
        Self {
            id,
            instrument,
            counterparty_id,
            netting_set_id,
        }
    }

    /// Returns the trade ID.
    #[inline]
    pub fn id(&self) -> &TradeId {
        &self.id
    }

    /// Returns the underlying instrument.
    #[inline]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Returns the counterparty ID.
    #[inline]
    pub fn counterparty_id(&self) -> &CounterpartyId {
        &self.counterparty_id
    }

    /// Returns the netting set ID.
    #[inline]
    pub fn netting_set_id(&self) -> &NettingSetId {
        &self.netting_set_id
    }

    /// Instrument notional.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.instrument.notional()
    }

    /// Instrument maturity.
    #[inline]
    pub fn maturity(&self) -> Date {
        self.instrument.maturity()
    }
}

impl FixingRequirements for Trade {
    fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)> {
        self.instrument.fixing_requirements()
    }
}
