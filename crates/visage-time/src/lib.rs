//! VISAGE Time - Animation clock and refresh loops
//!
//! This crate implements the two time sources of the engine:
//! - The animation clock: monotonic elapsed time + per-frame delta
//! - Cooperative request-next-tick loops over a display-refresh scheduler
//!
//! Nothing here spawns threads. The host owns the refresh source and calls
//! back into the loops once per refresh.

pub mod clock;
pub mod scheduler;

pub use clock::*;
pub use scheduler::*;
