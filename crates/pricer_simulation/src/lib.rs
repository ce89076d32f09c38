//! # pricer_simulation: Scenario Generation (Layer 3)
//!
//! Monte Carlo machinery that drives the exposure engine:
//!
//! - [`rng`]: seeded per-sample random numbers
//! - [`scenario`]: LGM state paths on a date grid
//! - [`fixings`]: path-consistent pseudo-fixings with exact restore
//! - [`market`]: the simulated market the calculators price against
//! - [`config`]: sample count, seed and thread configuration
//!
//! One worker owns one [`market::ScenarioSimMarket`], which in turn owns its
//! [`fixings::FixingManager`]; nothing in this crate is shared mutably
//! between threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod fixings;
pub mod market;
pub mod rng;
pub mod scenario;

pub use config::{SimulationConfig, SimulationConfigBuilder};
pub use error::{ConfigError, SimulationError};
