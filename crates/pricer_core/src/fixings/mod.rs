//! Historical fixing storage.
//!
//! A [`FixingStore`] holds the fixing history of every index a portfolio
//! references. Stores are plain values: each simulation worker owns one and
//! mutates it path by path, so no process-wide fixing state exists.

mod store;
mod time_series;

pub use store::FixingStore;
pub use time_series::TimeSeries;
