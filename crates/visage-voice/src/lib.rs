//! VISAGE Voice - Mouth motion from speech
//!
//! Two interchangeable lip-sync drivers write the mouth channels:
//! - Frequency driver: mean spectrum energy of live audio, smoothed
//! - Procedural driver: layered oscillators plus noise, for speech where
//!   only a "speaking" flag is available (text-to-speech without an
//!   accessible output stream)
//!
//! `LipSyncMode` holds at most one of them, so the two never write the
//! mouth in the same tick.
//!
//! Audio reaches the frequency driver through a `SpectrumSource`: a shared
//! tap fed from the audio side, or the built-in PCM analyser.

pub mod analyser;
pub mod frequency;
pub mod lipsync;
pub mod procedural;
pub mod spectrum;

pub use analyser::*;
pub use frequency::*;
pub use lipsync::*;
pub use procedural::*;
pub use spectrum::*;
