//! Legs of cash flows.

use super::coupon::{Cashflow, FixedCashflow, FixedRateCoupon, FloatingCoupon};
use crate::indices::InterestRateIndex;
use crate::market::MarketView;
use crate::schedules::Schedule;
use pricer_core::types::{Date, DateError, PricingError};

/// Whether the holder pays or receives a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegSide {
    /// Cash flows are paid (negative value to the holder).
    Pay,
    /// Cash flows are received.
    Receive,
}

impl LegSide {
    /// `-1.0` for paid legs, `+1.0` for received legs.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            LegSide::Pay => -1.0,
            LegSide::Receive => 1.0,
        }
    }
}

/// Ordered cash flows with a common side.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    side: LegSide,
    cashflows: Vec<Cashflow>,
}

impl Leg {
    /// Creates a leg from cash flows.
    pub fn new(side: LegSide, cashflows: Vec<Cashflow>) -> Self {
        Self { side, cashflows }
    }

    /// Single known payment.
    pub fn single_payment(side: LegSide, pay_date: Date, amount: f64) -> Self {
        Self::new(side, vec![Cashflow::Fixed(FixedCashflow { pay_date, amount })])
    }

    /// Fixed rate coupons on every period of `schedule`.
    pub fn fixed(side: LegSide, schedule: &Schedule, notional: f64, rate: f64) -> Self {
        let cashflows = schedule
            .iter()
            .map(|period| {
                Cashflow::FixedRate(FixedRateCoupon {
                    period: *period,
                    notional,
                    rate,
                })
            })
            .collect();
        Self::new(side, cashflows)
    }

    /// Floating coupons on every period of `schedule`, fixing in advance.
    pub fn floating(
        side: LegSide,
        schedule: &Schedule,
        notional: f64,
        index: &InterestRateIndex,
        spread: f64,
    ) -> Result<Self, DateError> {
        let cashflows = schedule
            .iter()
            .map(|period| {
                Ok(Cashflow::Floating(FloatingCoupon {
                    period: *period,
                    notional,
                    index: index.clone(),
                    spread,
                    fixing_date: index.fixing_date(period.start())?,
                }))
            })
            .collect::<Result<Vec<_>, DateError>>()?;
        Ok(Self::new(side, cashflows))
    }

    /// Pay or receive.
    #[inline]
    pub fn side(&self) -> LegSide {
        self.side
    }

    /// The cash flows.
    #[inline]
    pub fn cashflows(&self) -> &[Cashflow] {
        &self.cashflows
    }

    /// Last payment date, if any.
    pub fn maturity(&self) -> Option<Date> {
        self.cashflows.iter().map(Cashflow::pay_date).max()
    }

    /// Signed present value at the market date of all cash flows paid
    /// strictly after it.
    pub fn npv(&self, market: &dyn MarketView) -> Result<f64, PricingError> {
        let asof = market.asof();
        let mut npv = 0.0;
        for cf in self.cashflows.iter().filter(|cf| cf.pay_date() > asof) {
            npv += cf.amount(market)? * market.discount(cf.pay_date())?;
        }
        Ok(self.side.sign() * npv)
    }

    /// Every (index, fixing date) pair the leg depends on.
    pub fn fixing_requirements(&self) -> impl Iterator<Item = (&InterestRateIndex, Date)> {
        self.cashflows.iter().filter_map(Cashflow::fixing)
    }
}
