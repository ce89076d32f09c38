//! Payment schedules for cash-flow-bearing legs.
//!
//! - [`Frequency`]: Payment frequency
//! - [`Period`]: One accrual period with its payment date
//! - [`Schedule`] and [`ScheduleBuilder`]: Period generation between two dates
//! - [`ScheduleError`]: Schedule construction errors

mod error;
mod frequency;
mod period;
mod schedule;

pub use error::ScheduleError;
pub use frequency::Frequency;
pub use period::Period;
pub use schedule::{Schedule, ScheduleBuilder};
