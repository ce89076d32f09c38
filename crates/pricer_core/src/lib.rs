//! # pricer_core: Foundation Types for the Exposure Cube Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace and provides:
//! - Time types: `Date`, `Tenor`, `DayCountConvention` (`types::time`)
//! - Error types: `PricingError`, `DateError` (`types::error`)
//! - Yield and credit curves (`market_data`)
//! - Fixing histories: `TimeSeries`, `FixingStore` (`fixings`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - num-traits: Float-generic curve traits
//! - chrono: Date arithmetic
//! - thiserror: Market data errors
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::fixings::FixingStore;
//! use pricer_core::market_data::curves::{FlatCurve, YieldCurve};
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let today = Date::from_ymd(2024, 1, 1).unwrap();
//! let maturity = Date::from_ymd(2025, 1, 1).unwrap();
//! let t = DayCountConvention::ActualActual365.year_fraction_dates(today, maturity);
//!
//! let curve = FlatCurve::new(0.03_f64);
//! let df = curve.discount_factor(t).unwrap();
//! assert!(df < 1.0);
//!
//! let mut fixings = FixingStore::new();
//! fixings.add_fixing("EUR-EURIBOR-6M", today, 0.039);
//! assert_eq!(fixings.len(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `Date`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixings;
pub mod market_data;
pub mod types;
