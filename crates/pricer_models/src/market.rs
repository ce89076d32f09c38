//! The market interface instruments are valued against.

use crate::indices::InterestRateIndex;
use pricer_core::fixings::FixingStore;
use pricer_core::market_data::curves::{CurveEnum, YieldCurve};
use pricer_core::types::{Date, DayCountConvention, PricingError};

/// Read-only market view used by instrument pricing.
///
/// Implemented by [`StaticMarket`] for valuation at today and by the
/// scenario market of the simulation layer for simulated dates.
pub trait MarketView {
    /// Valuation date of the view.
    fn asof(&self) -> Date;

    /// Discount factor from `asof` to `date`; `date` must not precede `asof`.
    fn discount(&self, date: Date) -> Result<f64, PricingError>;

    /// Simply compounded forward rate of `index` for the accrual
    /// `[start, end]`, in the index day count.
    fn forward_rate(
        &self,
        index: &InterestRateIndex,
        start: Date,
        end: Date,
    ) -> Result<f64, PricingError>;

    /// Historical fixing of the index named `index` on `date`.
    fn fixing(&self, index: &str, date: Date) -> Option<f64>;
}

/// Simply compounded rate implied by two discount factors.
pub fn simple_forward(
    df_start: f64,
    df_end: f64,
    day_count: DayCountConvention,
    start: Date,
    end: Date,
) -> Result<f64, PricingError> {
    let tau = day_count.year_fraction_dates(start, end);
    if tau <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "empty forward period {} to {}",
            start, end
        )));
    }
    Ok((df_start / df_end - 1.0) / tau)
}

/// Deterministic market built from one curve and a fixing store.
///
/// # Examples
///
/// ```
/// use pricer_models::market::{MarketView, StaticMarket};
/// use pricer_core::fixings::FixingStore;
/// use pricer_core::market_data::curves::CurveEnum;
/// use pricer_core::types::Date;
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let market = StaticMarket::new(today, CurveEnum::flat(0.02), FixingStore::new());
/// let df = market.discount(Date::from_ymd(2025, 1, 1).unwrap()).unwrap();
/// assert!((df - (-0.02_f64 * 366.0 / 365.0).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct StaticMarket {
    asof: Date,
    curve: CurveEnum<f64>,
    fixings: FixingStore,
    day_count: DayCountConvention,
}

impl StaticMarket {
    /// Creates the market; curve times are ACT/365 from `asof`.
    pub fn new(asof: Date, curve: CurveEnum<f64>, fixings: FixingStore) -> Self {
        Self {
            asof,
            curve,
            fixings,
            day_count: DayCountConvention::ActualActual365,
        }
    }

    /// The fixing history.
    pub fn fixings(&self) -> &FixingStore {
        &self.fixings
    }
}

impl MarketView for StaticMarket {
    fn asof(&self) -> Date {
        self.asof
    }

    fn discount(&self, date: Date) -> Result<f64, PricingError> {
        let t = self.day_count.year_fraction_dates(self.asof, date);
        Ok(self.curve.discount_factor(t)?)
    }

    fn forward_rate(
        &self,
        index: &InterestRateIndex,
        start: Date,
        end: Date,
    ) -> Result<f64, PricingError> {
        simple_forward(
            self.discount(start)?,
            self.discount(end)?,
            index.day_count(),
            start,
            end,
        )
    }

    fn fixing(&self, index: &str, date: Date) -> Option<f64> {
        self.fixings.fixing(index, date)
    }
}
