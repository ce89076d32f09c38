//! Vanilla fixed-for-floating interest rate swap.

use super::error::InstrumentError;
use crate::cashflows::{Leg, LegSide};
use crate::indices::InterestRateIndex;
use crate::schedules::{Frequency, ScheduleBuilder};
use pricer_core::types::{Date, DayCountConvention};

/// Direction of a swap from the holder's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// Pay fixed, receive floating.
    PayFixed,
    /// Receive fixed, pay floating.
    ReceiveFixed,
}

/// Terms of a vanilla swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapTerms {
    /// Notional of both legs.
    pub notional: f64,
    /// Accrual start of the first period.
    pub start: Date,
    /// Final accrual end.
    pub maturity: Date,
    /// Fixed rate.
    pub fixed_rate: f64,
    /// Fixed leg payment frequency.
    pub fixed_frequency: Frequency,
    /// Fixed leg day count.
    pub fixed_day_count: DayCountConvention,
    /// Floating leg payment frequency.
    pub floating_frequency: Frequency,
    /// Floating index.
    pub index: InterestRateIndex,
    /// Spread over the index.
    pub spread: f64,
    /// Pay or receive fixed.
    pub direction: SwapDirection,
}

/// Fixed-for-floating swap made of two legs.
///
/// # Examples
///
/// ```
/// use pricer_models::indices::InterestRateIndex;
/// use pricer_models::instruments::{InterestRateSwap, SwapDirection, SwapTerms};
/// use pricer_models::schedules::Frequency;
/// use pricer_core::types::{Date, DayCountConvention, Tenor};
///
/// let index = InterestRateIndex::new(
///     "EUR-EURIBOR-6M",
///     Tenor::parse("6M").unwrap(),
///     DayCountConvention::ActualActual360,
///     2,
/// );
/// let swap = InterestRateSwap::new(SwapTerms {
///     notional: 10_000_000.0,
///     start: Date::from_ymd(2024, 1, 3).unwrap(),
///     maturity: Date::from_ymd(2029, 1, 3).unwrap(),
///     fixed_rate: 0.025,
///     fixed_frequency: Frequency::Annual,
///     fixed_day_count: DayCountConvention::Thirty360,
///     floating_frequency: Frequency::SemiAnnual,
///     index,
///     spread: 0.0,
///     direction: SwapDirection::PayFixed,
/// })
/// .unwrap();
///
/// assert_eq!(swap.fixed_leg().cashflows().len(), 5);
/// assert_eq!(swap.floating_leg().cashflows().len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterestRateSwap {
    notional: f64,
    maturity: Date,
    direction: SwapDirection,
    fixed_leg: Leg,
    floating_leg: Leg,
}

impl InterestRateSwap {
    /// Builds both legs from the terms.
    pub fn new(terms: SwapTerms) -> Result<Self, InstrumentError> {
        if !(terms.notional.is_finite() && terms.notional > 0.0) {
            return Err(InstrumentError::InvalidParameter {
                name: "notional",
                reason: format!("must be positive, got {}", terms.notional),
            });
        }
        if !terms.fixed_rate.is_finite() {
            return Err(InstrumentError::InvalidParameter {
                name: "fixed_rate",
                reason: "must be finite".to_string(),
            });
        }

        let fixed_schedule = ScheduleBuilder::new()
            .start(terms.start)
            .end(terms.maturity)
            .frequency(terms.fixed_frequency)
            .day_count(terms.fixed_day_count)
            .build()?;
        let floating_schedule = ScheduleBuilder::new()
            .start(terms.start)
            .end(terms.maturity)
            .frequency(terms.floating_frequency)
            .day_count(terms.index.day_count())
            .build()?;

        let (fixed_side, floating_side) = match terms.direction {
            SwapDirection::PayFixed => (LegSide::Pay, LegSide::Receive),
            SwapDirection::ReceiveFixed => (LegSide::Receive, LegSide::Pay),
        };

        Ok(Self {
            notional: terms.notional,
            maturity: terms.maturity,
            direction: terms.direction,
            fixed_leg: Leg::fixed(fixed_side, &fixed_schedule, terms.notional, terms.fixed_rate),
            floating_leg: Leg::floating(
                floating_side,
                &floating_schedule,
                terms.notional,
                &terms.index,
                terms.spread,
            )?,
        })
    }

    /// Notional.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Final accrual end.
    #[inline]
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Pay or receive fixed.
    #[inline]
    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    /// Fixed leg.
    #[inline]
    pub fn fixed_leg(&self) -> &Leg {
        &self.fixed_leg
    }

    /// Floating leg.
    #[inline]
    pub fn floating_leg(&self) -> &Leg {
        &self.floating_leg
    }
}
