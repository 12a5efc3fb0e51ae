//! Expression bank - named facial poses
//!
//! A pose only has an opinion about the channels it lists. Channels it does
//! not list are left alone, not pulled to zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use visage_core::*;
use visage_rig::ChannelRegistry;

/// Easing rate toward an expression's target weights
pub const ALPHA_EXPR: f32 = 0.1;

/// Named facial expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    #[default]
    Neutral,
    Happy,
    Excited,
    Thinking,
    Friendly,
    Surprised,
}

impl Expression {
    /// Every expression in the bank
    pub const ALL: [Expression; 6] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Excited,
        Expression::Thinking,
        Expression::Friendly,
        Expression::Surprised,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Excited => "excited",
            Expression::Thinking => "thinking",
            Expression::Friendly => "friendly",
            Expression::Surprised => "surprised",
        }
    }

    /// Target weight per channel at full intensity
    pub fn weights(self) -> &'static [(&'static str, f32)] {
        match self {
            Expression::Neutral => &[
                (MOUTH_SMILE, 0.0),
                (BROW_INNER_UP, 0.0),
                (EYE_WIDE_LEFT, 0.0),
                (EYE_WIDE_RIGHT, 0.0),
            ],
            Expression::Happy => &[
                (MOUTH_SMILE, 0.7),
                (BROW_INNER_UP, 0.3),
                (EYE_SQUINT_LEFT, 0.2),
                (EYE_SQUINT_RIGHT, 0.2),
            ],
            Expression::Excited => &[
                (MOUTH_SMILE, 0.9),
                (BROW_INNER_UP, 0.5),
                (EYE_WIDE_LEFT, 0.4),
                (EYE_WIDE_RIGHT, 0.4),
            ],
            Expression::Thinking => &[
                (MOUTH_SMILE, 0.1),
                (BROW_INNER_UP, 0.4),
                (EYE_SQUINT_LEFT, 0.1),
                (EYE_SQUINT_RIGHT, 0.1),
            ],
            Expression::Friendly => &[
                (MOUTH_SMILE, 0.5),
                (BROW_INNER_UP, 0.2),
                (EYE_WIDE_LEFT, 0.1),
                (EYE_WIDE_RIGHT, 0.1),
            ],
            Expression::Surprised => &[
                (MOUTH_SMILE, 0.2),
                (BROW_INNER_UP, 0.8),
                (EYE_WIDE_LEFT, 0.7),
                (EYE_WIDE_RIGHT, 0.7),
                (MOUTH_OPEN, 0.3),
            ],
        }
    }

    /// Target weight of one channel, if the expression defines it
    pub fn weight(self, channel: &str) -> Option<f32> {
        self.weights()
            .iter()
            .find(|(name, _)| *name == channel)
            .map(|(_, w)| *w)
    }

    /// Whether the pose names any lip-sync channel
    pub fn writes_mouth(self) -> bool {
        self.weights()
            .iter()
            .any(|(name, _)| MOUTH_CHANNELS.contains(name))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expression {
    type Err = VisageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| VisageError::UnknownExpression(s.to_string()))
    }
}

/// Ease every channel of `expression` toward `weight * intensity`, on every
/// mesh that exposes it
pub fn apply(registry: &mut ChannelRegistry, expression: Expression, intensity: f32) {
    for &(channel, weight) in expression.weights() {
        registry.ease_everywhere(channel, weight * intensity, ALPHA_EXPR);
    }
}

/// Name-based variant of [`apply`]. Unknown names are ignored.
pub fn apply_expression(registry: &mut ChannelRegistry, name: &str, intensity: f32) {
    match name.parse::<Expression>() {
        Ok(expression) => apply(registry, expression, intensity),
        Err(_) => tracing::trace!(name, "ignoring unknown expression"),
    }
}
