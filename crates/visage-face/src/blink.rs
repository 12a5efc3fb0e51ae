//! Blink controller
//!
//! A slow sine gives the periodic base rate; a per-frame random draw adds
//! occasional early blinks on top. Independent of every other system.

use rand::Rng;
use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult, BLINK_CHANNELS};
use visage_rig::ChannelRegistry;

/// Extra (non-periodic) blink probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExtraBlink {
    /// Fixed chance per rendered frame. Effective rate scales with refresh rate.
    PerFrame(f32),
    /// Expected extra blinks per second, independent of refresh rate
    PerSecond(f32),
}

impl ExtraBlink {
    /// Chance of an extra blink during a frame of length `dt`
    pub fn probability(&self, dt: f32) -> f32 {
        match *self {
            ExtraBlink::PerFrame(p) => p,
            ExtraBlink::PerSecond(rate) => 1.0 - (-rate * dt.max(0.0)).exp(),
        }
    }
}

impl Default for ExtraBlink {
    fn default() -> Self {
        ExtraBlink::PerFrame(0.01)
    }
}

/// Blink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Angular frequency of the periodic cycle (rad/s)
    pub frequency: f32,
    /// Cycle value above which the eyes close
    pub threshold: f32,
    /// Easing rate of the eyelid channels per frame
    pub rate: f32,
    /// Random extra blinks
    pub extra: ExtraBlink,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            frequency: 2.5,
            threshold: 0.95,
            rate: 0.4,
            extra: ExtraBlink::default(),
        }
    }
}

impl BlinkConfig {
    /// Periodic blinks only
    pub fn periodic() -> Self {
        Self {
            extra: ExtraBlink::PerFrame(0.0),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> VisageResult<()> {
        if !(self.frequency > 0.0) {
            return Err(VisageError::invalid_config("blink.frequency", "must be positive"));
        }
        if !(self.threshold > -1.0 && self.threshold < 1.0) {
            return Err(VisageError::invalid_config(
                "blink.threshold",
                "must be in (-1, 1) or the cycle never crosses it",
            ));
        }
        if !(self.rate > 0.0 && self.rate <= 1.0) {
            return Err(VisageError::invalid_config("blink.rate", "must be in (0, 1]"));
        }
        match self.extra {
            ExtraBlink::PerFrame(p) if !(0.0..=1.0).contains(&p) => Err(
                VisageError::invalid_config("blink.extra", "per-frame chance must be in [0, 1]"),
            ),
            ExtraBlink::PerSecond(rate) if !(rate >= 0.0) => Err(VisageError::invalid_config(
                "blink.extra",
                "per-second rate must be non-negative",
            )),
            _ => Ok(()),
        }
    }
}

/// Blink state
#[derive(Debug, Clone)]
pub struct BlinkController {
    config: BlinkConfig,
    /// Seconds of blink time
    blink_time: f32,
    /// Eyes were targeted closed last frame
    closing: bool,
    /// Blink onsets so far
    blinks: u64,
}

impl BlinkController {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            blink_time: 0.0,
            closing: false,
            blinks: 0,
        }
    }

    /// Advance one frame and ease the eyelids. Returns whether the eyes are
    /// targeted closed this frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        registry: &mut ChannelRegistry,
        dt: f32,
        rng: &mut R,
    ) -> bool {
        self.blink_time += dt;
        let cycle = (self.blink_time * self.config.frequency).sin();
        let extra = rng.gen::<f32>() < self.config.extra.probability(dt);
        let triggered = cycle > self.config.threshold || extra;

        if triggered && !self.closing {
            self.blinks += 1;
            tracing::trace!(blink_time = self.blink_time, extra, "blink");
        }
        self.closing = triggered;

        let target = if triggered { 1.0 } else { 0.0 };
        for channel in BLINK_CHANNELS {
            registry.ease_everywhere(channel, target, self.config.rate);
        }
        triggered
    }

    pub fn blink_time(&self) -> f32 {
        self.blink_time
    }

    /// Number of blink onsets so far
    pub fn blinks(&self) -> u64 {
        self.blinks
    }
}

impl Default for BlinkController {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}
