//! VISAGE Test Harness - Simulation and end-to-end validation
//!
//! This crate provides:
//! - Rig builders shaped like production avatars
//! - Synthetic speech audio
//! - A scripted, seeded compositor simulator with channel traces
//! - A live audio thread feeding the analyser for end-to-end runs

pub mod audio;
pub mod integration;
pub mod rig;
pub mod simulator;

pub use audio::*;
pub use integration::*;
pub use simulator::*;
