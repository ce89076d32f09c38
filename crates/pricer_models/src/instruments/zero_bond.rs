//! Zero coupon bond.

use super::error::InstrumentError;
use crate::cashflows::{Leg, LegSide};
use pricer_core::types::Date;

/// Single redemption at maturity.
///
/// # Examples
///
/// ```
/// use pricer_models::instruments::ZeroCouponBond;
/// use pricer_models::market::{MarketView, StaticMarket};
/// use pricer_core::fixings::FixingStore;
/// use pricer_core::market_data::curves::CurveEnum;
/// use pricer_core::types::Date;
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let maturity = Date::from_ymd(2029, 1, 1).unwrap();
/// let bond = ZeroCouponBond::new(1_000_000.0, maturity, true).unwrap();
///
/// let market = StaticMarket::new(today, CurveEnum::flat(0.03), FixingStore::new());
/// let npv = bond.leg().npv(&market).unwrap();
/// assert!((npv - 1_000_000.0 * market.discount(maturity).unwrap()).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCouponBond {
    notional: f64,
    maturity: Date,
    leg: Leg,
}

impl ZeroCouponBond {
    /// Creates a bond; `long` holds the bond, otherwise it is owed.
    pub fn new(notional: f64, maturity: Date, long: bool) -> Result<Self, InstrumentError> {
        if !(notional.is_finite() && notional > 0.0) {
            return Err(InstrumentError::InvalidParameter {
                name: "notional",
                reason: format!("must be positive, got {}", notional),
            });
        }
        let side = if long { LegSide::Receive } else { LegSide::Pay };
        Ok(Self {
            notional,
            maturity,
            leg: Leg::single_payment(side, maturity, notional),
        })
    }

    /// Redemption amount.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Redemption date.
    #[inline]
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// The redemption leg.
    #[inline]
    pub fn leg(&self) -> &Leg {
        &self.leg
    }
}
