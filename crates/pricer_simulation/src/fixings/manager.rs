//! Fixing manager implementation.

use super::error::FixingError;
use pricer_core::fixings::{FixingStore, TimeSeries};
use pricer_core::types::Date;
use pricer_models::indices::InterestRateIndex;
use pricer_models::instruments::Instrument;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use tracing::debug;

/// Anything that can list the (index, fixing date) pairs it depends on.
pub trait FixingRequirements {
    /// Every index fixing the holder's cash flows depend on.
    fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)>;
}

impl FixingRequirements for Instrument {
    fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)> {
        Instrument::fixing_requirements(self)
    }
}

impl FixingRequirements for [Instrument] {
    fn fixing_requirements(&self) -> Vec<(&InterestRateIndex, Date)> {
        self.iter()
            .flat_map(Instrument::fixing_requirements)
            .collect()
    }
}

/// Lifecycle of a [`FixingManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixingManagerState {
    /// Created, nothing captured.
    Idle,
    /// Histories captured, positioned at today.
    Initialised,
    /// At least one update applied on the current path.
    Stepping,
    /// Histories restored after a path.
    Reset,
}

#[derive(Debug, Clone)]
struct RequiredFixings {
    index: InterestRateIndex,
    dates: BTreeSet<Date>,
}

/// Writes pseudo-fixings along a path and restores the history afterwards.
///
/// The manager owns the fixing store it mutates. Every simulation worker
/// holds its own manager, so paths on different threads never share fixing
/// state.
///
/// # Examples
///
/// ```
/// use pricer_core::fixings::FixingStore;
/// use pricer_core::types::{Date, DayCountConvention, Tenor};
/// use pricer_models::indices::InterestRateIndex;
/// use pricer_models::instruments::{InterestRateSwap, Instrument, SwapDirection, SwapTerms};
/// use pricer_models::schedules::Frequency;
/// use pricer_simulation::fixings::FixingManager;
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let tenor = Tenor::parse("6M").unwrap();
/// let index = InterestRateIndex::new("IDX-6M", tenor, DayCountConvention::ActualActual360, 0);
/// let swap: Instrument = InterestRateSwap::new(SwapTerms {
///     notional: 1.0,
///     start: today,
///     maturity: Date::from_ymd(2026, 1, 1).unwrap(),
///     fixed_rate: 0.02,
///     fixed_frequency: Frequency::Annual,
///     fixed_day_count: DayCountConvention::Thirty360,
///     floating_frequency: Frequency::SemiAnnual,
///     index,
///     spread: 0.0,
///     direction: SwapDirection::PayFixed,
/// }).unwrap().into();
///
/// let mut manager = FixingManager::new(today, FixingStore::new());
/// manager.initialise(std::slice::from_ref(&swap));
///
/// // Jump a year: the fixings of July 2024 and January 2025 are back-filled
/// // with the fixing simulated at the target date.
/// let target = Date::from_ymd(2025, 1, 1).unwrap();
/// manager.update(target, |_| Some(0.031)).unwrap();
/// assert_eq!(manager.store().fixing("IDX-6M", Date::from_ymd(2024, 7, 1).unwrap()), Some(0.031));
///
/// manager.reset();
/// assert_eq!(manager.store().fixing("IDX-6M", Date::from_ymd(2024, 7, 1).unwrap()), None);
/// ```
#[derive(Debug, Clone)]
pub struct FixingManager {
    today: Date,
    current: Date,
    state: FixingManagerState,
    store: FixingStore,
    captured: BTreeMap<String, TimeSeries>,
    required: BTreeMap<String, RequiredFixings>,
}

impl FixingManager {
    /// Creates an idle manager owning `store`.
    pub fn new(today: Date, store: FixingStore) -> Self {
        Self {
            today,
            current: today,
            state: FixingManagerState::Idle,
            store,
            captured: BTreeMap::new(),
            required: BTreeMap::new(),
        }
    }

    /// Collects the fixing dates still to be simulated and captures the
    /// history of every referenced index.
    ///
    /// These are the dates after today, plus today itself when the history
    /// holds no fixing for it yet. Indices without any history get an empty
    /// one, so that pseudo-fixings can be written and later removed by
    /// `reset`.
    pub fn initialise<P: FixingRequirements + ?Sized>(&mut self, portfolio: &P) {
        self.required.clear();
        self.captured.clear();

        for (index, date) in portfolio.fixing_requirements() {
            let entry = self
                .required
                .entry(index.name().to_string())
                .or_insert_with(|| RequiredFixings {
                    index: index.clone(),
                    dates: BTreeSet::new(),
                });
            if date >= self.today {
                entry.dates.insert(date);
            }
        }

        // A fixing published today is historical, not simulated.
        for (name, required) in self.required.iter_mut() {
            if self.store.fixing(name, self.today).is_some() {
                required.dates.remove(&self.today);
            }
        }

        for name in self.required.keys() {
            let history = self.store.history(name).cloned().unwrap_or_default();
            if self.store.history(name).is_none() {
                self.store.set_history(name, history.clone());
            }
            self.captured.insert(name.clone(), history);
        }

        debug!(
            indices = self.required.len(),
            future_fixings = self.required.values().map(|r| r.dates.len()).sum::<usize>(),
            "fixing manager initialised"
        );
        self.current = self.today;
        self.state = FixingManagerState::Initialised;
    }

    /// Advances to `target`, back-filling every required fixing in
    /// `(current, target]` with the value `simulated` returns for its index
    /// at `target`.
    ///
    /// The first update of a path starts the window at today inclusive, so a
    /// fixing due today and missing from the history is written as well.
    ///
    /// # Errors
    ///
    /// - `NotInitialised` before `initialise`
    /// - `NonMonotonicDate` if `target` precedes the current date
    /// - `MissingSimulatedFixing` if `simulated` has no value for an index
    ///   that needs one
    pub fn update<F>(&mut self, target: Date, simulated: F) -> Result<(), FixingError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        if self.state == FixingManagerState::Idle {
            return Err(FixingError::NotInitialised);
        }
        if target < self.current {
            return Err(FixingError::NonMonotonicDate {
                target,
                current: self.current,
            });
        }

        let lower = if self.state == FixingManagerState::Stepping {
            Bound::Excluded(self.current)
        } else {
            Bound::Included(self.current)
        };
        let window = (lower, Bound::Included(target));
        let mut writes = Vec::new();
        for (name, required) in &self.required {
            let mut dates = required.dates.range(window).peekable();
            if dates.peek().is_none() {
                continue;
            }
            let value = simulated(name).ok_or_else(|| FixingError::MissingSimulatedFixing {
                index: name.clone(),
                date: target,
            })?;
            writes.extend(dates.map(|d| (name.clone(), *d, value)));
        }
        for (name, date, value) in writes {
            self.apply_fixing(&name, date, value)?;
        }

        self.current = target;
        self.state = FixingManagerState::Stepping;
        Ok(())
    }

    /// Writes one pseudo-fixing into a captured index history.
    pub fn apply_fixing(&mut self, index: &str, date: Date, value: f64) -> Result<(), FixingError> {
        if !self.captured.contains_key(index) {
            return Err(FixingError::UncapturedIndex {
                index: index.to_string(),
            });
        }
        match self.store.history_mut(index) {
            Some(history) => {
                history.insert(date, value);
                Ok(())
            }
            None => Err(FixingError::UncapturedIndex {
                index: index.to_string(),
            }),
        }
    }

    /// Restores every captured history and rewinds to today.
    pub fn reset(&mut self) {
        if self.state == FixingManagerState::Idle {
            return;
        }
        for (name, history) in &self.captured {
            self.store.set_history(name, history.clone());
        }
        self.current = self.today;
        self.state = FixingManagerState::Reset;
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> FixingManagerState {
        self.state
    }

    /// Date reached on the current path.
    #[inline]
    pub fn current_date(&self) -> Date {
        self.current
    }

    /// The live fixing store.
    #[inline]
    pub fn store(&self) -> &FixingStore {
        &self.store
    }

    /// Indices referenced by the portfolio.
    pub fn indices(&self) -> impl Iterator<Item = &InterestRateIndex> {
        self.required.values().map(|r| &r.index)
    }

    /// Fixing dates of an index that paths simulate.
    pub fn required_dates(&self, index: &str) -> Option<&BTreeSet<Date>> {
        self.required.get(index).map(|r| &r.dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::{DayCountConvention, Tenor};
    use pricer_models::instruments::{InterestRateSwap, SwapDirection, SwapTerms, ZeroCouponBond};
    use pricer_models::schedules::Frequency;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn index(name: &str) -> InterestRateIndex {
        InterestRateIndex::new(
            name,
            Tenor::parse("3M").unwrap(),
            DayCountConvention::ActualActual360,
            2,
        )
    }

    fn swap(name: &str, start: Date) -> Instrument {
        InterestRateSwap::new(SwapTerms {
            notional: 1.0,
            start,
            maturity: ymd(2026, 1, 15),
            fixed_rate: 0.02,
            fixed_frequency: Frequency::Annual,
            fixed_day_count: DayCountConvention::Thirty360,
            floating_frequency: Frequency::Quarterly,
            index: index(name),
            spread: 0.0,
            direction: SwapDirection::ReceiveFixed,
        })
        .unwrap()
        .into()
    }

    fn seeded_store() -> FixingStore {
        let mut store = FixingStore::new();
        store.add_fixing("IDX-A", ymd(2023, 10, 13), 0.030);
        store.add_fixing("OTHER", ymd(2023, 12, 1), 0.5);
        store
    }

    fn manager() -> FixingManager {
        let portfolio = vec![swap("IDX-A", ymd(2023, 10, 15)), swap("IDX-B", ymd(2024, 1, 15))];
        let mut manager = FixingManager::new(ymd(2024, 1, 1), seeded_store());
        manager.initialise(portfolio.as_slice());
        manager
    }

    #[test]
    fn test_initialise_collects_only_future_dates() {
        let manager = manager();
        assert_eq!(manager.state(), FixingManagerState::Initialised);
        let dates_a = manager.required_dates("IDX-A").unwrap();
        assert!(dates_a.iter().all(|d| *d > ymd(2024, 1, 1)));
        assert_eq!(dates_a.iter().next(), Some(&ymd(2024, 1, 13)));
        assert_eq!(manager.indices().count(), 2);
    }

    #[test]
    fn test_update_back_fills_with_target_value() {
        let mut manager = manager();
        manager
            .update(ymd(2024, 6, 1), |name| match name {
                "IDX-A" => Some(0.04),
                "IDX-B" => Some(0.05),
                _ => None,
            })
            .unwrap();

        assert_eq!(manager.store().fixing("IDX-A", ymd(2024, 1, 13)), Some(0.04));
        assert_eq!(manager.store().fixing("IDX-A", ymd(2024, 4, 13)), Some(0.04));
        assert_eq!(manager.store().fixing("IDX-B", ymd(2024, 1, 13)), Some(0.05));
        assert_eq!(manager.store().fixing("IDX-A", ymd(2024, 7, 13)), None);
        assert_eq!(manager.state(), FixingManagerState::Stepping);
        assert_eq!(manager.current_date(), ymd(2024, 6, 1));
    }

    #[test]
    fn test_missing_fixing_due_today_is_simulated() {
        let today = ymd(2024, 1, 1);
        // Fixing lag 2 puts the first fixing of a 2024-01-03 start on today.
        let portfolio = vec![swap("IDX-A", ymd(2024, 1, 3))];
        let mut manager = FixingManager::new(today, FixingStore::new());
        manager.initialise(portfolio.as_slice());
        assert_eq!(manager.required_dates("IDX-A").unwrap().iter().next(), Some(&today));

        manager.update(ymd(2024, 2, 1), |_| Some(0.045)).unwrap();
        assert_eq!(manager.store().fixing("IDX-A", today), Some(0.045));

        // Once stepping, today is outside the window.
        manager.update(ymd(2024, 3, 1), |_| Some(0.05)).unwrap();
        assert_eq!(manager.store().fixing("IDX-A", today), Some(0.045));

        // Every path starts again from today.
        manager.reset();
        assert_eq!(manager.store().fixing("IDX-A", today), None);
        manager.update(ymd(2024, 2, 1), |_| Some(0.02)).unwrap();
        assert_eq!(manager.store().fixing("IDX-A", today), Some(0.02));
    }

    #[test]
    fn test_published_fixing_due_today_is_kept() {
        let today = ymd(2024, 1, 1);
        let portfolio = vec![swap("IDX-A", ymd(2024, 1, 3))];
        let mut store = FixingStore::new();
        store.add_fixing("IDX-A", today, 0.033);
        let mut manager = FixingManager::new(today, store);
        manager.initialise(portfolio.as_slice());
        assert!(!manager.required_dates("IDX-A").unwrap().contains(&today));

        manager.update(ymd(2024, 2, 1), |_| Some(0.045)).unwrap();
        assert_eq!(manager.store().fixing("IDX-A", today), Some(0.033));
    }

    #[test]
    fn test_update_without_dates_in_window_needs_no_value() {
        let mut manager = manager();
        manager.update(ymd(2024, 1, 5), |_| None).unwrap();
        assert_eq!(manager.current_date(), ymd(2024, 1, 5));
    }

    #[test]
    fn test_missing_simulated_value() {
        let mut manager = manager();
        let err = manager.update(ymd(2024, 2, 1), |_| None).unwrap_err();
        assert!(matches!(err, FixingError::MissingSimulatedFixing { .. }));
    }

    #[test]
    fn test_backwards_update_rejected() {
        let mut manager = manager();
        manager.update(ymd(2024, 6, 1), |_| Some(0.01)).unwrap();
        let err = manager.update(ymd(2024, 3, 1), |_| Some(0.01)).unwrap_err();
        assert_eq!(
            err,
            FixingError::NonMonotonicDate {
                target: ymd(2024, 3, 1),
                current: ymd(2024, 6, 1),
            }
        );
    }

    #[test]
    fn test_update_before_initialise() {
        let mut manager = FixingManager::new(ymd(2024, 1, 1), FixingStore::new());
        assert_eq!(
            manager.update(ymd(2024, 2, 1), |_| Some(0.0)),
            Err(FixingError::NotInitialised)
        );
    }

    #[test]
    fn test_uncaptured_index_write_fails() {
        let mut manager = manager();
        let err = manager.apply_fixing("OTHER", ymd(2024, 2, 1), 1.0).unwrap_err();
        assert_eq!(
            err,
            FixingError::UncapturedIndex {
                index: "OTHER".to_string()
            }
        );
    }

    #[test]
    fn test_reset_restores_history_and_untouched_indices() {
        let mut manager = manager();
        let before = manager.store().clone();
        manager.update(ymd(2025, 6, 1), |_| Some(0.07)).unwrap();
        assert_ne!(manager.store(), &before);

        manager.reset();
        assert_eq!(manager.store(), &before);
        assert_eq!(manager.current_date(), ymd(2024, 1, 1));
        assert_eq!(manager.state(), FixingManagerState::Reset);

        // A new path can start from today again.
        manager.update(ymd(2024, 2, 1), |_| Some(0.01)).unwrap();
    }

    #[test]
    fn test_portfolio_without_floating_legs() {
        let bond: Instrument = ZeroCouponBond::new(1.0, ymd(2030, 1, 1), true).unwrap().into();
        let mut manager = FixingManager::new(ymd(2024, 1, 1), FixingStore::new());
        manager.initialise(std::slice::from_ref(&bond));
        assert_eq!(manager.indices().count(), 0);
        manager.update(ymd(2029, 1, 1), |_| None).unwrap();
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_reset_is_exact_after_any_update_sequence(
                mut steps in proptest::collection::vec(1i64..400, 1..12),
                values in proptest::collection::vec(-0.02f64..0.1, 12),
            ) {
                let mut manager = manager();
                let before = manager.store().clone();

                steps.sort_unstable();
                let today = ymd(2024, 1, 1);
                for (i, offset) in steps.iter().enumerate() {
                    let target = today.add_days(*offset).unwrap();
                    let v = values[i];
                    manager.update(target, |_| Some(v)).unwrap();
                }
                manager.reset();
                prop_assert_eq!(manager.store(), &before);
            }
        }
    }
}
