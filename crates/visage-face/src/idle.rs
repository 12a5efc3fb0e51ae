//! Idle motion - breathing and head sway on the root transform
//!
//! Silent: slow deterministic sway, a pure function of time.
//! Speaking: jittery but continuous motion easing toward a random target
//! that is redrawn every `sway_interval` seconds of speech.

use rand::Rng;
use serde::{Deserialize, Serialize};
use visage_core::{ease, Euler, FrameTime, RootTransform, VisageError, VisageResult};

/// Idle motion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Resting height of the root
    pub base_y: f32,
    /// Seconds of speech between sway targets
    pub sway_interval: f32,
    /// Half-range of the yaw target while speaking (rad)
    pub sway_x: f32,
    /// Half-range of the pitch target while speaking (rad)
    pub sway_y: f32,
    /// Easing rate toward the sway target
    pub sway_rate: f32,
    /// Easing rate of the roll wobble
    pub roll_rate: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            base_y: -4.8,
            sway_interval: 0.3,
            sway_x: 0.06,
            sway_y: 0.04,
            sway_rate: 0.08,
            roll_rate: 0.05,
        }
    }
}

impl IdleConfig {
    pub fn validate(&self) -> VisageResult<()> {
        if !(self.sway_interval > 0.0) {
            return Err(VisageError::invalid_config(
                "idle.sway_interval",
                "must be positive",
            ));
        }
        if !(self.sway_x >= 0.0 && self.sway_y >= 0.0) {
            return Err(VisageError::invalid_config("idle.sway", "must be non-negative"));
        }
        for (field, rate) in [
            ("idle.sway_rate", self.sway_rate),
            ("idle.roll_rate", self.roll_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(VisageError::invalid_config(field, "must be in (0, 1]"));
            }
        }
        Ok(())
    }
}

/// Breathing offset added to the resting height
pub fn breathing(t: f32) -> f32 {
    (t * 0.5).sin() * 0.01
}

/// Silent head sway at time `t`
pub fn idle_rotation(t: f32) -> Euler {
    Euler {
        x: (t * 0.2).cos() * 0.02,
        y: (t * 0.3).sin() * 0.03,
        z: (t * 0.25).sin() * 0.01,
    }
}

/// Speaking sway target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwayState {
    /// Seconds since the target was drawn
    pub time: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Idle motion state
#[derive(Debug, Clone)]
pub struct IdleMotion {
    config: IdleConfig,
    sway: SwayState,
}

impl IdleMotion {
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            sway: SwayState::default(),
        }
    }

    pub fn sway(&self) -> SwayState {
        self.sway
    }

    /// Root transform at rest, before the first frame
    pub fn rest_pose(&self) -> RootTransform {
        let mut root = RootTransform::default();
        root.position.y = self.config.base_y;
        root
    }

    /// Move the root for one frame
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        root: &mut RootTransform,
        frame: FrameTime,
        speaking: bool,
        rng: &mut R,
    ) {
        let t = frame.elapsed;
        root.position.y = self.config.base_y + breathing(t);

        if !speaking {
            root.rotation = idle_rotation(t);
            return;
        }

        self.sway.time += frame.delta;
        if self.sway.time > self.config.sway_interval {
            self.sway.time = 0.0;
            self.sway.offset_x = (rng.gen::<f32>() - 0.5) * 2.0 * self.config.sway_x;
            self.sway.offset_y = (rng.gen::<f32>() - 0.5) * 2.0 * self.config.sway_y;
        }

        let rotation = &mut root.rotation;
        rotation.y = ease(rotation.y, self.sway.offset_x, self.config.sway_rate);
        rotation.x = ease(rotation.x, self.sway.offset_y, self.config.sway_rate);
        rotation.z = ease(rotation.z, (t * 2.0).sin() * 0.02, self.config.roll_rate);
    }
}

impl Default for IdleMotion {
    fn default() -> Self {
        Self::new(IdleConfig::default())
    }
}
