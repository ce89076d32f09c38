//! Random number generation for path simulation.

mod prng;

pub use prng::PricerRng;
