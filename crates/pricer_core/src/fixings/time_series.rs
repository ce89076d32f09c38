//! Date-ordered series of values.

use crate::types::time::Date;
use std::collections::BTreeMap;

/// Ordered mapping from date to value.
///
/// # Examples
///
/// ```
/// use pricer_core::fixings::TimeSeries;
/// use pricer_core::types::Date;
///
/// let mut series = TimeSeries::new();
/// let d = Date::from_ymd(2024, 1, 2).unwrap();
/// series.insert(d, 0.031);
/// assert_eq!(series.get(d), Some(0.031));
/// assert_eq!(series.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    values: BTreeMap<Date, f64>,
}

impl TimeSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the value for `date`.
    #[inline]
    pub fn insert(&mut self, date: Date, value: f64) -> Option<f64> {
        self.values.insert(date, value)
    }

    /// Value on `date`, if any.
    #[inline]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Whether a value exists on `date`.
    #[inline]
    pub fn contains(&self, date: Date) -> bool {
        self.values.contains_key(&date)
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Latest observation on or before `date`.
    pub fn last_on_or_before(&self, date: Date) -> Option<(Date, f64)> {
        self.values
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v))
    }

    /// Iterates observations in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }
}

impl FromIterator<(Date, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_iteration_is_date_ordered() {
        let series: TimeSeries = vec![(ymd(2024, 3, 1), 3.0), (ymd(2024, 1, 1), 1.0)]
            .into_iter()
            .collect();
        let dates: Vec<Date> = series.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 3, 1)]);
    }

    #[test]
    fn test_last_on_or_before() {
        let series: TimeSeries = vec![(ymd(2024, 1, 1), 1.0), (ymd(2024, 2, 1), 2.0)]
            .into_iter()
            .collect();
        assert_eq!(series.last_on_or_before(ymd(2024, 1, 20)), Some((ymd(2024, 1, 1), 1.0)));
        assert_eq!(series.last_on_or_before(ymd(2023, 12, 31)), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut series = TimeSeries::new();
        assert_eq!(series.insert(ymd(2024, 1, 1), 1.0), None);
        assert_eq!(series.insert(ymd(2024, 1, 1), 2.0), Some(1.0));
        assert_eq!(series.get(ymd(2024, 1, 1)), Some(2.0));
    }
}
