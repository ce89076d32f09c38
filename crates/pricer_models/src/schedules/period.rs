//! Accrual period definition.

use pricer_core::types::time::{Date, DayCountConvention};

/// A single accrual period of a schedule.
///
/// Coupons accrue from `start` to `end` under the period's day count and
/// settle on `payment`, which rolls after `end` when the payment lag is
/// positive.
///
/// # Examples
///
/// ```
/// use pricer_models::schedules::Period;
/// use pricer_core::types::time::{Date, DayCountConvention};
///
/// let period = Period::new(
///     Date::from_ymd(2024, 1, 15).unwrap(),
///     Date::from_ymd(2024, 7, 15).unwrap(),
///     DayCountConvention::ActualActual360,
/// );
/// assert_eq!(period.payment(), period.end());
/// assert!((period.year_fraction() - 182.0 / 360.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    /// First accrual date.
    start: Date,
    /// Last accrual date.
    end: Date,
    /// Settlement date of the coupon.
    payment: Date,
    /// Convention used for the accrual year fraction.
    day_count: DayCountConvention,
}

impl Period {
    /// Creates a period paying on its end date.
    ///
    /// # Arguments
    ///
    /// * `start` - First accrual date
    /// * `end` - Last accrual date, also the payment date
    /// * `day_count` - Convention for the accrual year fraction
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_models::schedules::Period;
    /// use pricer_core::types::time::{Date, DayCountConvention};
    ///
    /// let period = Period::new(
    ///     Date::from_ymd(2024, 1, 15).unwrap(),
    ///     Date::from_ymd(2025, 1, 15).unwrap(),
    ///     DayCountConvention::Thirty360,
    /// );
    /// assert!((period.year_fraction() - 1.0).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn new(start: Date, end: Date, day_count: DayCountConvention) -> Self {
        Self {
            start,
            end,
            payment: end,
            day_count,
        }
    }

    /// Creates a period with an explicit payment date.
    ///
    /// Accrual still runs from `start` to `end`. Only the settlement date,
    /// and so the date the coupon leaves the portfolio, moves.
    ///
    /// # Arguments
    ///
    /// * `start` - First accrual date
    /// * `end` - Last accrual date
    /// * `payment` - Settlement date, usually `end` plus the payment lag
    /// * `day_count` - Convention for the accrual year fraction
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_models::schedules::Period;
    /// use pricer_core::types::time::{Date, DayCountConvention};
    ///
    /// let end = Date::from_ymd(2024, 7, 15).unwrap();
    /// let payment = Date::from_ymd(2024, 7, 17).unwrap();
    /// let period = Period::with_payment(
    ///     Date::from_ymd(2024, 1, 15).unwrap(),
    ///     end,
    ///     payment,
    ///     DayCountConvention::ActualActual360,
    /// );
    /// assert_eq!(period.end(), end);
    /// assert_eq!(period.payment(), payment);
    /// ```
    #[inline]
    pub fn with_payment(
        start: Date,
        end: Date,
        payment: Date,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            start,
            end,
            payment,
            day_count,
        }
    }

    /// Accrual start.
    #[inline]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Accrual end.
    #[inline]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Payment date.
    #[inline]
    pub fn payment(&self) -> Date {
        self.payment
    }

    /// Day count convention of the accrual.
    #[inline]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Accrual year fraction.
    #[inline]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_dates(self.start, self.end)
    }
}
