//! VISAGE Core - Fundamental types shared by the animation engine
//!
//! This crate defines the types every other VISAGE crate speaks:
//! - Identifiers (MeshId, BoneId, SessionId)
//! - Frame time and the nominal refresh step
//! - Blend channel names used by the drivers
//! - Easing and root transform math
//! - The error type for the few fallible surfaces

pub mod channel;
pub mod error;
pub mod id;
pub mod math;
pub mod time;

pub use channel::*;
pub use error::*;
pub use id::*;
pub use math::*;
pub use time::*;
