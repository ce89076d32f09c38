//! Dates, tenors and day count conventions.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `Tenor`: A period such as `3M` or `1Y` used to build simulation grids
//!   and instrument schedules
//! - `DayCountConvention`: Year fraction conventions
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{Date, DayCountConvention, Tenor};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Tenor::parse("6M").unwrap().advance(start).unwrap();
//! assert_eq!(end, Date::from_ymd(2024, 7, 1).unwrap());
//!
//! let yf = DayCountConvention::ActualActual365.year_fraction_dates(start, end);
//! assert!((yf - 0.4986).abs() < 0.001);
//! ```

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Ordered, hashable and `Copy`, so it can key the fixing histories and
/// simulation grids directly.
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::Date;
///
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let later = date.add_days(10).unwrap();
/// assert_eq!(later - date, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format (YYYY-MM-DD).
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let date = Date::parse("2024-06-15").unwrap();
    /// assert_eq!(date.year(), 2024);
    /// assert!(Date::parse("15/06/2024").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("'{}': {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    #[inline]
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Moves the date by a signed number of calendar days.
    ///
    /// # Errors
    ///
    /// Returns `DateError::OutOfRange` if the result is not representable.
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted.map(Date).ok_or(DateError::OutOfRange {
            base: self.to_string(),
            shift: format!("{}D", days),
        })
    }

    /// Moves the date forward by whole months, clamping to month end.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let jan31 = Date::from_ymd(2024, 1, 31).unwrap();
    /// assert_eq!(jan31.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// ```
    pub fn add_months(self, months: u32) -> Result<Self, DateError> {
        self.0
            .checked_add_months(Months::new(months))
            .map(Date)
            .ok_or(DateError::OutOfRange {
                base: self.to_string(),
                shift: format!("{}M", months),
            })
    }
}

impl Sub for Date {
    type Output = i64;

    /// Number of calendar days from `other` to `self`.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Unit of a [`Tenor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven calendar days.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl TimeUnit {
    fn suffix(&self) -> char {
        match self {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        }
    }
}

/// A period expressed as a length and a unit, e.g. `3M`.
///
/// Tenors are measured from a fixed anchor date rather than chained, so
/// `Tenor::parse("2M")` from January 31st lands on the last day of March.
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::{Date, Tenor, TimeUnit};
///
/// let tenor = Tenor::parse("2w").unwrap();
/// assert_eq!(tenor.unit(), TimeUnit::Weeks);
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// assert_eq!(tenor.advance(today).unwrap(), Date::from_ymd(2024, 1, 15).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tenor {
    length: u32,
    unit: TimeUnit,
}

impl Tenor {
    /// Creates a tenor from its length and unit.
    pub fn new(length: u32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// Parses `<n>D`, `<n>W`, `<n>M` or `<n>Y` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let trimmed = s.trim();
        let invalid = || DateError::InvalidTenor(s.to_string());

        let unit = match trimmed.chars().last().map(|c| c.to_ascii_uppercase()) {
            Some('D') => TimeUnit::Days,
            Some('W') => TimeUnit::Weeks,
            Some('M') => TimeUnit::Months,
            Some('Y') => TimeUnit::Years,
            _ => return Err(invalid()),
        };
        let digits = &trimmed[..trimmed.len() - 1];
        let length = digits.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self { length, unit })
    }

    /// Number of units.
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Unit of the tenor.
    #[inline]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns `date` moved forward by this tenor.
    pub fn advance(&self, date: Date) -> Result<Date, DateError> {
        match self.unit {
            TimeUnit::Days => date.add_days(i64::from(self.length)),
            TimeUnit::Weeks => date.add_days(7 * i64::from(self.length)),
            TimeUnit::Months => date.add_months(self.length),
            TimeUnit::Years => date.add_months(12 * self.length),
        }
    }

    /// Rough length in years, used for sorting and bucketing only.
    pub fn approximate_years(&self) -> f64 {
        let n = f64::from(self.length);
        match self.unit {
            TimeUnit::Days => n / 365.0,
            TimeUnit::Weeks => 7.0 * n / 365.0,
            TimeUnit::Months => n / 12.0,
            TimeUnit::Years => n,
        }
    }
}

impl FromStr for Tenor {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Tenor::parse(s)
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

/// Day count convention (year fraction convention).
///
/// # Variants
/// - `ActualActual365`: Actual days / 365
/// - `ActualActual360`: Actual days / 360
/// - `Thirty360`: 30/360 US bond basis
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayCountConvention {
    /// Actual/365 Fixed.
    ActualActual365,
    /// Actual/360.
    ActualActual360,
    /// 30/360 US bond basis.
    Thirty360,
}

impl DayCountConvention {
    /// Returns the market name of the convention.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActualActual365 => "ACT/365",
            DayCountConvention::ActualActual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between two dates; negative when `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::{Date, DayCountConvention};
    ///
    /// let start = Date::from_ymd(2024, 1, 1).unwrap();
    /// let end = Date::from_ymd(2024, 7, 1).unwrap();
    ///
    /// let yf = DayCountConvention::Thirty360.year_fraction_dates(start, end);
    /// assert!((yf - 0.5).abs() < 1e-12);
    /// let back = DayCountConvention::Thirty360.year_fraction_dates(end, start);
    /// assert!((back + 0.5).abs() < 1e-12);
    /// ```
    pub fn year_fraction_dates(&self, start: Date, end: Date) -> f64 {
        let days = end - start;

        match self {
            DayCountConvention::ActualActual365 => days as f64 / 365.0,
            DayCountConvention::ActualActual360 => days as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (lo, hi, sign) = if start <= end {
                    (start, end, 1.0)
                } else {
                    (end, start, -1.0)
                };

                let d1 = if lo.day() == 31 { 30 } else { lo.day() };
                let d2 = if hi.day() == 31 && d1 == 30 {
                    30
                } else {
                    hi.day()
                };

                let days_30_360 = 360 * (hi.year() - lo.year())
                    + 30 * (hi.month() as i32 - lo.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days_30_360 as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = String;

    /// Parses a convention name (case-insensitive, `/` and spaces ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' '], "").as_str() {
            "ACT365" | "ACTUAL365" | "A365" | "ACT365F" => Ok(DayCountConvention::ActualActual365),
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::ActualActual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(format!("Unknown day count convention: {}", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_date_display_is_iso() {
        assert_eq!(ymd(2024, 3, 5).to_string(), "2024-03-05");
    }

    #[test]
    fn test_add_days_negative() {
        assert_eq!(ymd(2024, 3, 1).add_days(-1).unwrap(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(ymd(2023, 1, 31).add_months(1).unwrap(), ymd(2023, 2, 28));
    }

    #[test]
    fn test_tenor_parse_and_display() {
        for s in ["1D", "2W", "3M", "10Y"] {
            let tenor = Tenor::parse(s).unwrap();
            assert_eq!(tenor.to_string(), s);
        }
        assert_eq!(Tenor::parse("6m").unwrap(), Tenor::new(6, TimeUnit::Months));
    }

    #[test]
    fn test_tenor_parse_rejects_garbage() {
        assert!(matches!(Tenor::parse("M"), Err(DateError::InvalidTenor(_))));
        assert!(matches!(Tenor::parse("3X"), Err(DateError::InvalidTenor(_))));
        assert!(matches!(Tenor::parse(""), Err(DateError::InvalidTenor(_))));
    }

    #[test]
    fn test_tenor_advance_years() {
        assert_eq!(
            Tenor::parse("1Y").unwrap().advance(ymd(2024, 2, 29)).unwrap(),
            ymd(2025, 2, 28)
        );
    }

    #[test]
    fn test_act_365_year_fraction() {
        let yf = DayCountConvention::ActualActual365.year_fraction_dates(
            ymd(2024, 1, 1),
            ymd(2025, 1, 1),
        );
        assert_relative_eq!(yf, 366.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_day_count_from_str() {
        assert_eq!(
            "Act/360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::ActualActual360
        );
        assert!("ACT/ACT ISDA".parse::<DayCountConvention>().is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_add_days_round_trip(
                year in 1990i32..2090,
                month in 1u32..13,
                day in 1u32..29,
                shift in -5000i64..5000,
            ) {
                let date = ymd(year, month, day);
                let moved = date.add_days(shift).unwrap();
                prop_assert_eq!(moved - date, shift);
                prop_assert_eq!(moved.add_days(-shift).unwrap(), date);
            }
        }
    }
}
