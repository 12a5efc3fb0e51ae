//! VISAGE Face - The non-speech half of the avatar
//!
//! Everything here runs every frame regardless of audio:
//! - Expression bank: named poses over a subset of channels
//! - Expression cycle: picks and blends toward an expression while speaking
//! - Blink controller: periodic blinks plus occasional extra ones
//! - Idle motion: breathing bob and head sway on the root transform
//!
//! Each system owns a disjoint set of channels, so their order inside a tick
//! does not matter.

pub mod blink;
pub mod cycle;
pub mod expression;
pub mod idle;

pub use blink::*;
pub use cycle::*;
pub use expression::*;
pub use idle::*;
