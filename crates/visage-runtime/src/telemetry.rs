//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the filter passed in. Installing twice is an error,
//! not a panic, so tests and embedding hosts can call this freely.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use visage_core::{VisageError, VisageResult};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter: `RUST_LOG` if set and valid, else `default_filter`
pub fn env_filter(default_filter: &str) -> VisageResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| VisageError::Telemetry(format!("bad filter {default_filter:?}: {e}"))),
    }
}

/// Install the global tracing subscriber
pub fn init_tracing(default_filter: &str, format: LogFormat) -> VisageResult<()> {
    let filter = env_filter(default_filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| VisageError::Telemetry(e.to_string()))
}
