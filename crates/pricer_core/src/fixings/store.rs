//! Fixing histories keyed by index name.

use super::TimeSeries;
use crate::types::time::Date;
use std::collections::BTreeMap;

/// Fixing history of every index known to a market.
///
/// Cloning a store is the capture mechanism used by the fixing manager: the
/// clone taken before a path is restored verbatim after it.
///
/// # Examples
///
/// ```
/// use pricer_core::fixings::FixingStore;
/// use pricer_core::types::Date;
///
/// let mut store = FixingStore::new();
/// let d = Date::from_ymd(2024, 1, 2).unwrap();
/// store.add_fixing("EUR-EURIBOR-6M", d, 0.039);
///
/// assert_eq!(store.fixing("EUR-EURIBOR-6M", d), Some(0.039));
/// assert_eq!(store.fixing("USD-SOFR", d), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixingStore {
    series: BTreeMap<String, TimeSeries>,
}

impl FixingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fixing, creating the index history on first use.
    pub fn add_fixing(&mut self, index: &str, date: Date, value: f64) {
        self.series
            .entry(index.to_string())
            .or_default()
            .insert(date, value);
    }

    /// Fixing of `index` on `date`.
    pub fn fixing(&self, index: &str, date: Date) -> Option<f64> {
        self.series.get(index).and_then(|s| s.get(date))
    }

    /// Full history of an index.
    pub fn history(&self, index: &str) -> Option<&TimeSeries> {
        self.series.get(index)
    }

    /// Replaces the history of an index.
    pub fn set_history(&mut self, index: &str, history: TimeSeries) {
        self.series.insert(index.to_string(), history);
    }

    /// Mutable history of an index that already exists in the store.
    pub fn history_mut(&mut self, index: &str) -> Option<&mut TimeSeries> {
        self.series.get_mut(index)
    }

    /// Index names in lexicographic order.
    pub fn indices(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of indices with a history.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when no index has a history.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_history_replaces() {
        let d = Date::from_ymd(2024, 5, 1).unwrap();
        let mut store = FixingStore::new();
        store.add_fixing("IDX", d, 1.0);
        store.set_history("IDX", TimeSeries::new());
        assert_eq!(store.fixing("IDX", d), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let d = Date::from_ymd(2024, 5, 1).unwrap();
        let mut store = FixingStore::new();
        store.add_fixing("IDX", d, 1.0);
        let snapshot = store.clone();
        store.add_fixing("IDX", d, 2.0);
        assert_eq!(snapshot.fixing("IDX", d), Some(1.0));
        assert_ne!(snapshot, store);
    }
}
