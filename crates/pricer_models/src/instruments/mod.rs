//! Instrument definitions.
//!
//! Instruments are a closed enum dispatched statically. Every instrument is a
//! set of [`Leg`]s, so valuation, maturity and fixing requirements derive from
//! the legs.
//!
//! - [`ZeroCouponBond`]: Single redemption
//! - [`InterestRateSwap`]: Fixed against floating

mod error;
mod swap;
mod zero_bond;

pub use error::InstrumentError;
pub use swap::{InterestRateSwap, SwapDirection, SwapTerms};
pub use zero_bond::ZeroCouponBond;

use crate::cashflows::Leg;
use crate::indices::InterestRateIndex;
use crate::market::MarketView;
use pricer_core::types::{Date, PricingError};

/// Any priceable instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum Instrument {
    /// Zero coupon bond.
    ZeroCouponBond(ZeroCouponBond),
    /// Vanilla interest rate swap.
    InterestRateSwap(InterestRateSwap),
}

impl Instrument {
    /// Short type name used in reports and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Instrument::ZeroCouponBond(_) => "ZeroCouponBond",
            Instrument::InterestRateSwap(_) => "InterestRateSwap",
        }
    }

    /// Cash-flow-bearing legs.
    pub fn legs(&self) -> Vec<&Leg> {
        match self {
            Instrument::ZeroCouponBond(bond) => vec![bond.leg()],
            Instrument::InterestRateSwap(swap) => vec![swap.fixed_leg(), swap.floating_leg()],
        }
    }

    /// Value at the market date in the market's currency units.
    pub fn npv(&self, market: &dyn MarketView) -> Result<f64, PricingError> {
        self.legs().iter().map(|leg| leg.npv(market)).sum()
    }

    /// Notional.
    pub fn notional(&self) -> f64 {
        match self {
            Instrument::ZeroCouponBond(bond) => bond.notional(),
            Instrument::InterestRateSwap(swap) => swap.notional(),
        }
    }

    /// Final payment or accrual date.
    pub fn maturity(&self) -> Date {
        match self {
            Instrument::ZeroCouponBond(bond) => bond.maturity(),
            Instrument::InterestRateSwap(swap) => swap.maturity(),
        }
    }

    /// Every (index, fixing date) pair across all legs.
    pub fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)> {
        self.legs()
            .into_iter()
            .flat_map(|leg| leg.fixing_requirements())
            .collect()
    }
}

impl From<ZeroCouponBond> for Instrument {
    fn from(bond: ZeroCouponBond) -> Self {
        Instrument::ZeroCouponBond(bond)
    }
}

impl From<InterestRateSwap> for Instrument {
    fn from(swap: InterestRateSwap) -> Self {
        Instrument::InterestRateSwap(swap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::StaticMarket;
    use crate::schedules::Frequency;
    use approx::assert_relative_eq;
    use pricer_core::fixings::FixingStore;
    use pricer_core::market_data::curves::CurveEnum;
    use pricer_core::types::{DayCountConvention, Tenor};

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn index() -> InterestRateIndex {
        InterestRateIndex::new(
            "IDX-6M",
            Tenor::parse("6M").unwrap(),
            DayCountConvention::ActualActual365,
            0,
        )
    }

    fn swap(direction: SwapDirection, fixed_rate: f64) -> Instrument {
        InterestRateSwap::new(SwapTerms {
            notional: 1_000_000.0,
            start: ymd(2024, 1, 1),
            maturity: ymd(2027, 1, 1),
            fixed_rate,
            fixed_frequency: Frequency::SemiAnnual,
            fixed_day_count: DayCountConvention::ActualActual365,
            floating_frequency: Frequency::SemiAnnual,
            index: index(),
            spread: 0.0,
            direction,
        })
        .unwrap()
        .into()
    }

    #[test]
    fn test_zero_bond_npv() {
        let market = StaticMarket::new(ymd(2024, 1, 1), CurveEnum::flat(0.04), FixingStore::new());
        let bond: Instrument = ZeroCouponBond::new(100.0, ymd(2026, 1, 1), true).unwrap().into();
        let t: f64 = 731.0 / 365.0;
        assert_relative_eq!(bond.npv(&market).unwrap(), 100.0 * (-0.04 * t).exp(), epsilon = 1e-10);
        assert!(bond.fixing_requirements().is_empty());
    }

    #[test]
    fn test_swap_directions_are_opposite() {
        let market = StaticMarket::new(ymd(2024, 1, 1), CurveEnum::flat(0.03), FixingStore::new());
        let payer = swap(SwapDirection::PayFixed, 0.025).npv(&market).unwrap();
        let receiver = swap(SwapDirection::ReceiveFixed, 0.025).npv(&market).unwrap();
        assert_relative_eq!(payer, -receiver, epsilon = 1e-8);
        assert!(payer > 0.0);
    }

    #[test]
    fn test_swap_at_par_rate_has_zero_value() {
        // Floating leg with matching schedules and ACT/365 discounting
        // is worth 1 - DF(T) per unit notional; solve the par rate from it.
        let market = StaticMarket::new(ymd(2024, 1, 1), CurveEnum::flat(0.03), FixingStore::new());
        let unit = swap(SwapDirection::ReceiveFixed, 1.0);
        let Instrument::InterestRateSwap(irs) = &unit else {
            unreachable!()
        };
        let annuity = irs.fixed_leg().npv(&market).unwrap() / 1_000_000.0;
        let par = (1.0 - market.discount(ymd(2027, 1, 1)).unwrap()) / annuity;
        let npv = swap(SwapDirection::PayFixed, par).npv(&market).unwrap();
        assert!(npv.abs() < 1e-6, "par swap npv {}", npv);
    }

    #[test]
    fn test_invalid_notional_rejected() {
        assert!(matches!(
            ZeroCouponBond::new(-1.0, ymd(2025, 1, 1), true),
            Err(InstrumentError::InvalidParameter { name: "notional", .. })
        ));
    }
}
