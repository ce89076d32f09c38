//! Simulation date grid with optional close-out dates.

use pricer_core::types::{Date, DateError, Tenor};
use thiserror::Error;

/// Date grid errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DateGridError {
    /// No valuation dates.
    #[error("Date grid has no valuation dates")]
    Empty,

    /// Valuation dates must be strictly increasing and after today.
    #[error("Valuation date {date} out of order")]
    Unordered {
        /// Offending date.
        date: Date,
    },

    /// Close-out date count differs from valuation date count.
    #[error("Expected {expected} close-out dates, got {got}")]
    CloseOutCount {
        /// Number of valuation dates.
        expected: usize,
        /// Number of close-out dates given.
        got: usize,
    },

    /// A close-out date is not after its valuation date or passes the next one.
    #[error("Close-out date {close_out} must lie in ({valuation}, {next}]")]
    CloseOutOrder {
        /// Close-out date.
        close_out: Date,
        /// Its valuation date.
        valuation: Date,
        /// The next valuation date, or the close-out itself for the last one.
        next: Date,
    },

    /// Date arithmetic failed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}

/// One simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStep {
    /// Date the scenario is generated for.
    pub date: Date,
    /// Cube date index the step writes to.
    pub valuation_index: usize,
    /// Whether this is the close-out step of `valuation_index`.
    pub is_close_out: bool,
}

/// Valuation dates, each optionally followed by a close-out date.
///
/// Close-out step `i` lies strictly after valuation date `i` and no later
/// than valuation date `i + 1`, so the merged step sequence is chronological
/// and every close-out state is a strict successor of its default-date state.
///
/// # Examples
///
/// ```
/// use pricer_core::types::{Date, Tenor};
/// use pricer_exposure::date_grid::DateGrid;
///
/// let today = Date::from_ymd(2024, 1, 1).unwrap();
/// let tenors = ["3M", "6M", "1Y"].map(|t| Tenor::parse(t).unwrap());
/// let grid = DateGrid::from_tenors(today, &tenors)
///     .unwrap()
///     .with_mpor_days(14)
///     .unwrap();
///
/// assert_eq!(grid.len(), 3);
/// assert_eq!(grid.steps().len(), 6);
/// assert_eq!(grid.close_out_dates().unwrap()[0], Date::from_ymd(2024, 4, 15).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DateGrid {
    today: Date,
    valuation_dates: Vec<Date>,
    close_out_dates: Option<Vec<Date>>,
    steps: Vec<GridStep>,
}

impl DateGrid {
    /// Grid of the given valuation dates without close-out dates.
    pub fn new(today: Date, valuation_dates: Vec<Date>) -> Result<Self, DateGridError> {
        if valuation_dates.is_empty() {
            return Err(DateGridError::Empty);
        }
        let mut previous = today;
        for date in &valuation_dates {
            if *date <= previous {
                return Err(DateGridError::Unordered { date: *date });
            }
            previous = *date;
        }
        let mut grid = Self {
            today,
            valuation_dates,
            close_out_dates: None,
            steps: Vec::new(),
        };
        grid.build_steps();
        Ok(grid)
    }

    /// Grid of `today + tenor` for every tenor.
    pub fn from_tenors(today: Date, tenors: &[Tenor]) -> Result<Self, DateGridError> {
        let dates = tenors
            .iter()
            .map(|t| t.advance(today))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(today, dates)
    }

    /// Adds close-out dates `valuation + days` calendar days.
    pub fn with_mpor_days(self, days: u32) -> Result<Self, DateGridError> {
        let close_outs = self
            .valuation_dates
            .iter()
            .map(|d| d.add_days(i64::from(days)))
            .collect::<Result<Vec<_>, _>>()?;
        self.with_close_out_dates(close_outs)
    }

    /// Adds explicit close-out dates, one per valuation date.
    ///
    /// # Errors
    ///
    /// - `CloseOutCount` unless there is one close-out date per valuation date
    /// - `CloseOutOrder` if a close-out date is on or before its valuation
    ///   date, or after the next valuation date
    pub fn with_close_out_dates(mut self, close_outs: Vec<Date>) -> Result<Self, DateGridError> {
        if close_outs.len() != self.valuation_dates.len() {
            return Err(DateGridError::CloseOutCount {
                expected: self.valuation_dates.len(),
                got: close_outs.len(),
            });
        }
        for (i, (valuation, close_out)) in
            self.valuation_dates.iter().zip(&close_outs).enumerate()
        {
            let next = self.valuation_dates.get(i + 1).copied().unwrap_or(*close_out);
            if close_out <= valuation || *close_out > next {
                return Err(DateGridError::CloseOutOrder {
                    close_out: *close_out,
                    valuation: *valuation,
                    next,
                });
            }
        }
        self.close_out_dates = Some(close_outs);
        self.build_steps();
        Ok(self)
    }

    fn build_steps(&mut self) {
        self.steps = self
            .valuation_dates
            .iter()
            .enumerate()
            .flat_map(|(i, date)| {
                let default = GridStep {
                    date: *date,
                    valuation_index: i,
                    is_close_out: false,
                };
                let close_out = self.close_out_dates.as_ref().map(|c| GridStep {
                    date: c[i],
                    valuation_index: i,
                    is_close_out: true,
                });
                std::iter::once(default).chain(close_out)
            })
            .collect();
    }

    /// Today.
    #[inline]
    pub fn today(&self) -> Date {
        self.today
    }

    /// Number of valuation dates.
    #[inline]
    pub fn len(&self) -> usize {
        self.valuation_dates.len()
    }

    /// Always false for a constructed grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.valuation_dates.is_empty()
    }

    /// Valuation (default) dates.
    #[inline]
    pub fn valuation_dates(&self) -> &[Date] {
        &self.valuation_dates
    }

    /// Close-out dates, if the grid has them.
    #[inline]
    pub fn close_out_dates(&self) -> Option<&[Date]> {
        self.close_out_dates.as_deref()
    }

    /// Whether every valuation date has a close-out date.
    #[inline]
    pub fn has_close_out(&self) -> bool {
        self.close_out_dates.is_some()
    }

    /// Chronological simulation steps.
    #[inline]
    pub fn steps(&self) -> &[GridStep] {
        &self.steps
    }

    /// Dates of all steps, in order.
    pub fn step_dates(&self) -> Vec<Date> {
        self.steps.iter().map(|s| s.date).collect()
    }

    /// Calendar days in the margin period of valuation date `i`: the
    /// close-out lag when the grid has one, otherwise the days since the
    /// previous grid date.
    pub fn period_days(&self, i: usize) -> Option<i64> {
        let date = *self.valuation_dates.get(i)?;
        match &self.close_out_dates {
            Some(close_outs) => Some(close_outs[i] - date),
            None => {
                let previous = if i == 0 {
                    self.today
                } else {
                    self.valuation_dates[i - 1]
                };
                Some(date - previous)
            }
        }
    }
}
