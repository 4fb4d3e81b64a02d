//! Tracing subscriber setup for binaries and integration harnesses.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedding program's choice. The filter comes from `RUST_LOG`, defaulting
//! to `info`.

use serde::{Deserialize, Serialize};
use sharereg_types::{RegistryError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Install the global tracing subscriber.
///
/// # Errors
/// Returns `Configuration` if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init(),
    };
    result.map_err(|e| RegistryError::Configuration(format!("tracing already initialized: {e}")))
}
