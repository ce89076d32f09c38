//! Interest rate indices referenced by floating coupons.

use pricer_core::types::{Date, DateError, DayCountConvention, Tenor};
use std::fmt;

/// An IBOR-style index: a name, the tenor of the rate it fixes and its day
/// count.
///
/// The name keys the index history in a
/// [`FixingStore`](pricer_core::fixings::FixingStore).
///
/// # Examples
///
/// ```
/// use pricer_models::indices::InterestRateIndex;
/// use pricer_core::types::{Date, DayCountConvention, Tenor};
///
/// let index = InterestRateIndex::new(
///     "EUR-EURIBOR-6M",
///     Tenor::parse("6M").unwrap(),
///     DayCountConvention::ActualActual360,
///     2,
/// );
/// let start = Date::from_ymd(2024, 3, 4).unwrap();
/// assert_eq!(index.fixing_date(start).unwrap(), Date::from_ymd(2024, 3, 2).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterestRateIndex {
    name: String,
    tenor: Tenor,
    day_count: DayCountConvention,
    fixing_days: u32,
}

impl InterestRateIndex {
    /// Creates an index.
    pub fn new(
        name: impl Into<String>,
        tenor: Tenor,
        day_count: DayCountConvention,
        fixing_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            tenor,
            day_count,
            fixing_days,
        }
    }

    /// Index name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tenor of the underlying deposit.
    #[inline]
    pub fn tenor(&self) -> Tenor {
        self.tenor
    }

    /// Day count of the fixed rate.
    #[inline]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Calendar days between fixing and value date.
    #[inline]
    pub fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    /// Fixing date for an accrual period starting on `value_date`.
    pub fn fixing_date(&self, value_date: Date) -> Result<Date, DateError> {
        value_date.add_days(-i64::from(self.fixing_days))
    }

    /// Value date of a fixing observed on `fixing_date`.
    pub fn value_date(&self, fixing_date: Date) -> Result<Date, DateError> {
        fixing_date.add_days(i64::from(self.fixing_days))
    }

    /// End of the deposit period starting on `value_date`.
    pub fn maturity_date(&self, value_date: Date) -> Result<Date, DateError> {
        self.tenor.advance(value_date)
    }
}

impl fmt::Display for InterestRateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
