//! Path-consistent fixing management.
//!
//! Coupons fixing between today and a simulated date need a fixing that does
//! not exist yet in the real history. The [`FixingManager`] writes those
//! pseudo-fixings from the simulated market as a path advances and puts the
//! captured history back before the next path.

mod error;
mod manager;

pub use error::FixingError;
pub use manager::{FixingManager, FixingManagerState, FixingRequirements};
