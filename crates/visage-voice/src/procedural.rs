//! Procedural speech - synthetic mouth motion without audio
//!
//! Three oscillators layered at syllable, word and phrase rate plus a little
//! noise. The syllable oscillator's phase is re-drawn at random syllable
//! boundaries so the rhythm never settles into an obvious loop.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult, FRAME_DT, MOUTH_FUNNEL, MOUTH_OPEN, MOUTH_PUCKER};
use visage_rig::ChannelRegistry;

use crate::close_mouth;

/// Upper bound of the synthetic mouth opening
pub const MAX_SPEECH_OPEN: f32 = 0.85;

/// Amplitude of the per-frame noise term
pub const SPEECH_NOISE: f32 = 0.15;

/// How far speech time advances per tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SpeechStep {
    /// Constant step per tick. Speech speed follows the refresh rate.
    Fixed(f32),
    /// The real frame delta
    RealDelta,
}

impl SpeechStep {
    pub fn resolve(&self, dt: f32) -> f32 {
        match *self {
            SpeechStep::Fixed(step) => step,
            SpeechStep::RealDelta => dt.max(0.0),
        }
    }
}

impl Default for SpeechStep {
    fn default() -> Self {
        SpeechStep::Fixed(FRAME_DT)
    }
}

/// Procedural driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralConfig {
    pub step: SpeechStep,
    /// Minimum seconds between phase re-draws
    pub syllable_interval: f32,
}

impl Default for ProceduralConfig {
    fn default() -> Self {
        Self {
            step: SpeechStep::default(),
            syllable_interval: 0.15,
        }
    }
}

impl ProceduralConfig {
    pub fn validate(&self) -> VisageResult<()> {
        if let SpeechStep::Fixed(step) = self.step {
            if !(step > 0.0) {
                return Err(VisageError::invalid_config(
                    "procedural.step",
                    "fixed step must be positive",
                ));
            }
        }
        if !(self.syllable_interval > 0.0) {
            return Err(VisageError::invalid_config(
                "procedural.syllable_interval",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// State of one speaking session
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeechState {
    pub time: f32,
    pub phase: f32,
    pub syllable_time: f32,
}

/// Mouth opening at speech time `time`
pub fn mouth_open(time: f32, phase: f32, noise: f32) -> f32 {
    let fast = (time * 18.0 + phase).sin() * 0.5 + 0.5;
    let medium = (time * 9.0).sin() * 0.5 + 0.5;
    let slow = (time * 4.0).sin() * 0.3 + 0.4;
    (fast * 0.35 + medium * 0.3 + slow * 0.25 + noise * 0.1).clamp(0.0, MAX_SPEECH_OPEN)
}

pub fn mouth_funnel(time: f32) -> f32 {
    ((time * 5.0).sin() * 0.15 + 0.15).max(0.0)
}

pub fn mouth_pucker(time: f32) -> f32 {
    ((time * 7.0 + 1.0).sin() * 0.1 + 0.1).max(0.0)
}

/// Oscillator-driven lip sync
#[derive(Debug, Clone, Default)]
pub struct ProceduralDriver {
    config: ProceduralConfig,
    state: SpeechState,
}

impl ProceduralDriver {
    pub fn new(config: ProceduralConfig) -> Self {
        Self {
            config,
            state: SpeechState::default(),
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    /// Advance one tick and write the mouth. Returns the mouth opening.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        registry: &mut ChannelRegistry,
        dt: f32,
        rng: &mut R,
    ) -> f32 {
        let step = self.config.step.resolve(dt);
        let state = &mut self.state;
        state.time += step;
        state.syllable_time += step;

        let noise = rng.gen::<f32>() * SPEECH_NOISE;
        let open = mouth_open(state.time, state.phase, noise);
        registry.set_everywhere(MOUTH_OPEN, open);

        if state.syllable_time > self.config.syllable_interval && rng.gen_bool(0.5) {
            state.phase = rng.gen_range(0.0..PI);
            state.syllable_time = 0.0;
        }

        registry.set_everywhere(MOUTH_FUNNEL, mouth_funnel(state.time));
        registry.set_everywhere(MOUTH_PUCKER, mouth_pucker(state.time));
        open
    }

    /// Close the mouth at session end
    pub fn finish(&self, registry: &mut ChannelRegistry) {
        close_mouth(registry);
    }
}
