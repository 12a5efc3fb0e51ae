//! Avatar configuration
//!
//! One struct gathers the per-system configs. Every field has a default, so
//! a partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult};
use visage_face::{BlinkConfig, ExpressionConfig, ExtraBlink, IdleConfig};
use visage_voice::{AnalyserConfig, ProceduralConfig, SpeechStep};

/// Extra blinks per second matching `ExtraBlink::PerFrame(0.01)` at 60 fps
pub const EXTRA_BLINKS_PER_SECOND: f32 = 0.6;

/// Avatar configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
    pub expression: ExpressionConfig,
    pub blink: BlinkConfig,
    pub idle: IdleConfig,
    pub procedural: ProceduralConfig,
    pub analyser: AnalyserConfig,
}

impl AvatarConfig {
    /// Timing that does not depend on the display refresh rate:
    /// extra blinks per second and procedural speech on the real delta
    pub fn frame_rate_independent() -> Self {
        Self {
            blink: BlinkConfig {
                extra: ExtraBlink::PerSecond(EXTRA_BLINKS_PER_SECOND),
                ..BlinkConfig::default()
            },
            procedural: ProceduralConfig {
                step: SpeechStep::RealDelta,
                ..ProceduralConfig::default()
            },
            ..Self::default()
        }
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> VisageResult<Self> {
        let config: AvatarConfig =
            serde_json::from_str(json).map_err(|e| VisageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> VisageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisageError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> VisageResult<()> {
        self.expression.validate()?;
        self.blink.validate()?;
        self.idle.validate()?;
        self.procedural.validate()?;
        self.analyser.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visage_face::Expression;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AvatarConfig::default().validate().is_ok());
        assert!(AvatarConfig::frame_rate_independent().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = AvatarConfig::default();
        assert_eq!(config.idle.base_y, -4.8);
        assert_eq!(config.blink.extra, ExtraBlink::PerFrame(0.01));
        assert_eq!(config.procedural.step, SpeechStep::Fixed(0.016));
        assert_eq!(config.analyser.fft_size, 512);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_partial_json() {
        let config = AvatarConfig::from_json(
            r#"{
                "seed": 42,
                "idle": { "base_y": -3.0 },
                "expression": { "rotation": ["happy", "thinking"] },
                "blink": { "extra": { "kind": "per_second", "value": 0.5 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.idle.base_y, -3.0);
        assert_eq!(config.idle.sway_interval, 0.3);
        assert_eq!(
            config.expression.rotation,
            vec![Expression::Happy, Expression::Thinking]
        );
        assert_eq!(config.blink.extra, ExtraBlink::PerSecond(0.5));
        assert_eq!(config.blink.rate, 0.4);
    }

    #[test]
    fn test_json_round_trip() {
        let config = AvatarConfig::frame_rate_independent().with_seed(7);
        let json = config.to_json().unwrap();
        assert_eq!(AvatarConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            AvatarConfig::from_json("{ not json"),
            Err(VisageError::ConfigParse(_))
        ));
        assert!(matches!(
            AvatarConfig::from_json(r#"{"expression": {"rotation": ["grumpy"]}}"#),
            Err(VisageError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        let err = AvatarConfig::from_json(r#"{"blink": {"rate": 2.0}}"#).unwrap_err();
        assert!(matches!(
            err,
            VisageError::InvalidConfig {
                field: "blink.rate",
                ..
            }
        ));

        let err = AvatarConfig::from_json(r#"{"analyser": {"fft_size": 300}}"#).unwrap_err();
        assert_eq!(err, VisageError::InvalidFftSize(300));

        // surprised opens the mouth, which lip sync owns while speaking
        let err = AvatarConfig::from_json(r#"{"expression": {"rotation": ["happy", "surprised"]}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            VisageError::InvalidConfig {
                field: "expression.rotation",
                ..
            }
        ));
    }
}
