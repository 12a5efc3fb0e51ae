//! Error types for VISAGE
//!
//! Nothing inside a frame tick fails: missing channels, unknown expressions
//! and lost audio input are all silent no-ops. Errors only come out of the
//! setup surfaces (configuration, analyser construction, parsing).

use thiserror::Error;

/// Core VISAGE errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisageError {
    // Configuration errors
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    // Expression errors
    #[error("Unknown expression: {0}")]
    UnknownExpression(String),

    // Audio analysis errors
    #[error("Invalid FFT size {0}: must be a power of two in [32, 32768]")]
    InvalidFftSize(usize),

    #[error("Invalid decibel range: min {min} must be below max {max}")]
    InvalidDecibelRange { min: f32, max: f32 },

    // Runtime errors
    #[error("Telemetry init failed: {0}")]
    Telemetry(String),
}

impl VisageError {
    /// Shorthand for a config field violation
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        VisageError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for VISAGE operations
pub type VisageResult<T> = Result<T, VisageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VisageError::invalid_config("blink.rate", "must be in (0, 1]");
        assert_eq!(err.to_string(), "Invalid config: blink.rate must be in (0, 1]");

        let err = VisageError::InvalidFftSize(100);
        assert!(err.to_string().contains("100"));
    }
}
