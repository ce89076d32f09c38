//! Individual cash flow types.

use crate::indices::InterestRateIndex;
use crate::market::MarketView;
use crate::schedules::Period;
use pricer_core::types::{Date, PricingError};

/// Known amount paid on a date, e.g. a bond redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCashflow {
    /// Payment date.
    pub pay_date: Date,
    /// Amount paid.
    pub amount: f64,
}

/// Fixed rate coupon accruing over a period.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateCoupon {
    /// Accrual period.
    pub period: Period,
    /// Notional the rate applies to.
    pub notional: f64,
    /// Annual rate.
    pub rate: f64,
}

/// Coupon paying an index fixing plus a spread.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingCoupon {
    /// Accrual period.
    pub period: Period,
    /// Notional the rate applies to.
    pub notional: f64,
    /// Index the coupon fixes on.
    pub index: InterestRateIndex,
    /// Spread over the fixing.
    pub spread: f64,
    /// Date the index is observed.
    pub fixing_date: Date,
}

impl FloatingCoupon {
    /// The coupon rate before the spread.
    ///
    /// Fixings observed before the market date must be in the history; a
    /// fixing observed on the market date is used when present and
    /// forecast otherwise; later fixings are forecast from the curve.
    pub fn index_rate(&self, market: &dyn MarketView) -> Result<f64, PricingError> {
        let asof = market.asof();
        if self.fixing_date <= asof {
            if let Some(fixing) = market.fixing(self.index.name(), self.fixing_date) {
                return Ok(fixing);
            }
            if self.fixing_date < asof {
                return Err(PricingError::MissingFixing {
                    index: self.index.name().to_string(),
                    date: self.fixing_date,
                });
            }
        }
        market.forward_rate(&self.index, self.period.start(), self.period.end())
    }
}

/// Any cash flow a leg can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Cashflow {
    /// Known amount.
    Fixed(FixedCashflow),
    /// Fixed rate coupon.
    FixedRate(FixedRateCoupon),
    /// Floating coupon.
    Floating(FloatingCoupon),
}

impl Cashflow {
    /// Payment date.
    pub fn pay_date(&self) -> Date {
        match self {
            Cashflow::Fixed(cf) => cf.pay_date,
            Cashflow::FixedRate(cpn) => cpn.period.payment(),
            Cashflow::Floating(cpn) => cpn.period.payment(),
        }
    }

    /// Amount paid, projected against `market` where necessary.
    pub fn amount(&self, market: &dyn MarketView) -> Result<f64, PricingError> {
        match self {
            Cashflow::Fixed(cf) => Ok(cf.amount),
            Cashflow::FixedRate(cpn) => Ok(cpn.notional * cpn.rate * cpn.period.year_fraction()),
            Cashflow::Floating(cpn) => {
                let rate = cpn.index_rate(market)? + cpn.spread;
                Ok(cpn.notional * rate * cpn.period.year_fraction())
            }
        }
    }

    /// Index and fixing date when the cash flow depends on a fixing.
    pub fn fixing(&self) -> Option<(&InterestRateIndex, Date)> {
        match self {
            Cashflow::Floating(cpn) => Some((&cpn.index, cpn.fixing_date)),
            _ => None,
        }
    }
}
