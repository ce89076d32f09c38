//! # Pricer Models (L2: Business Logic)
//!
//! Instruments, cash flows and the stochastic model of the simulation.
//!
//! This crate provides:
//! - Payment schedules (`schedules`)
//! - Interest rate indices (`indices`)
//! - Cash flows and legs (`cashflows`)
//! - Instruments valued against a [`market::MarketView`] (`instruments`)
//! - The LGM one-factor model (`models`)
//!
//! ## Design Principles
//!
//! - **Enum-based instruments** for static dispatch
//! - **Leg-based valuation**: every instrument is a set of legs, so fixing
//!   requirements are discovered uniformly
//! - **Builder pattern** for schedules

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod cashflows;
pub mod indices;
pub mod instruments;
pub mod market;
pub mod models;
pub mod schedules;
