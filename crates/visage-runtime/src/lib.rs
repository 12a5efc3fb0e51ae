//! VISAGE Runtime - Avatar runtime
//!
//! This crate ties the systems together:
//! - Frame compositor: one ordered tick over idle motion, expressions,
//!   blinks and lip sync
//! - Speech sessions: start/end/error signals and driver selection
//! - Avatar host: render and lip-sync loops over a refresh scheduler
//! - Configuration and tracing setup

pub mod compositor;
pub mod config;
pub mod host;
pub mod session;
pub mod telemetry;

pub use compositor::*;
pub use config::*;
pub use host::*;
pub use session::*;
pub use telemetry::*;

pub use visage_core::{VisageError, VisageResult};
