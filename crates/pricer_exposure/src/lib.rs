//! # pricer_exposure: Exposure Cube Engine (Layer 4)
//!
//! Populates NPV cubes by pricing a portfolio along simulated market paths
//! and aggregates them into exposure, CVA and dynamic initial margin.
//!
//! ## Flow
//!
//! 1. Build a [`portfolio::Portfolio`] and a [`date_grid::DateGrid`]
//! 2. Configure an [`engine::EngineConfig`] and run the
//!    [`engine::ValuationEngine`] against a scenario market
//! 3. Net the trade cube ([`aggregation::net_trade_values`]), derive
//!    exposure profiles, CVA and DIM
//! 4. Export through a [`report::Report`] sink or the
//!    [`output::CubeWriter`]
//!
//! ## Modules
//!
//! - [`cube`]: dense `(id, date, sample, depth)` storage with a T0 slice
//! - [`calculators`]: per-step valuation calculators writing into cubes
//! - [`engine`]: the parallel simulation loop
//! - [`margin`]: parametric VaR over key-rate sensitivities
//! - [`aggregation`]: netting, exposure profiles, CVA and DIM
//! - [`report`], [`output`]: tabular and cube exports

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod aggregation;
pub mod calculators;
pub mod cube;
pub mod date_grid;
pub mod engine;
pub mod margin;
pub mod output;
pub mod portfolio;
pub mod report;

pub use cube::{CubeError, NpvCube};
pub use date_grid::{DateGrid, DateGridError};
pub use engine::{EngineConfig, EngineError, EngineOutput, MporMode, ValuationEngine};
pub use portfolio::{Portfolio, PortfolioBuilder};
