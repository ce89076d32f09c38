//! Stochastic models driving the scenario simulation.
//!
//! - [`lgm`]: One-factor linear Gauss-Markov interest rate model

pub mod lgm;

mod error;

pub use error::ModelError;
pub use lgm::LgmModel;
