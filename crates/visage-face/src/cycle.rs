//! Expression cycle - keeps a speaking face lively
//!
//! While speaking, a new expression is drawn every `interval` seconds and
//! blended in at `speaking_intensity`. While silent, a low-intensity neutral
//! pose is applied every frame, which also eases out whatever was active
//! when speech ended.

use rand::Rng;
use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult, MOUTH_CHANNELS};
use visage_rig::ChannelRegistry;

use crate::{apply, Expression};

/// Expression cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Seconds of speech between expression draws
    pub interval: f32,
    /// Intensity of the drawn expression while speaking
    pub speaking_intensity: f32,
    /// Intensity of the neutral pose while silent
    pub idle_intensity: f32,
    /// Pool the speaking expression is drawn from
    pub rotation: Vec<Expression>,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            interval: 2.0,
            speaking_intensity: 0.7,
            idle_intensity: 0.3,
            rotation: vec![
                Expression::Friendly,
                Expression::Happy,
                Expression::Excited,
                Expression::Thinking,
            ],
        }
    }
}

impl ExpressionConfig {
    pub fn validate(&self) -> VisageResult<()> {
        if !(self.interval > 0.0) {
            return Err(VisageError::invalid_config(
                "expression.interval",
                "must be positive",
            ));
        }
        for (field, value) in [
            ("expression.speaking_intensity", self.speaking_intensity),
            ("expression.idle_intensity", self.idle_intensity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VisageError::invalid_config(field, "must be in [0, 1]"));
            }
        }
        if self.rotation.is_empty() {
            return Err(VisageError::invalid_config(
                "expression.rotation",
                "must name at least one expression",
            ));
        }
        // the mouth belongs to lip sync while speaking
        if let Some(expression) = self.rotation.iter().find(|e| e.writes_mouth()) {
            return Err(VisageError::invalid_config(
                "expression.rotation",
                format!("{expression} drives a mouth channel"),
            ));
        }
        Ok(())
    }
}

/// Expression session state
#[derive(Debug, Clone)]
pub struct ExpressionCycle {
    config: ExpressionConfig,
    /// Expression blended in while speaking
    current: Expression,
    /// Seconds of speech since the last draw
    timer: f32,
}

impl ExpressionCycle {
    pub fn new(config: ExpressionConfig) -> Self {
        Self {
            config,
            current: Expression::Neutral,
            timer: 0.0,
        }
    }

    pub fn current(&self) -> Expression {
        self.current
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance one frame. Returns the newly drawn expression when the
    /// interval elapsed this frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        registry: &mut ChannelRegistry,
        dt: f32,
        speaking: bool,
        rng: &mut R,
    ) -> Option<Expression> {
        if !speaking {
            apply(registry, Expression::Neutral, self.config.idle_intensity);
            return None;
        }

        self.timer += dt;
        let mut drawn = None;
        if self.timer > self.config.interval && !self.config.rotation.is_empty() {
            let pick = rng.gen_range(0..self.config.rotation.len());
            self.current = self.config.rotation[pick];
            self.timer = 0.0;
            tracing::debug!(expression = %self.current, "expression switched");
            drawn = Some(self.current);
        }

        apply(registry, self.current, self.config.speaking_intensity);
        drawn
    }
}

impl Default for ExpressionCycle {
    fn default() -> Self {
        Self::new(ExpressionConfig::default())
    }
}
