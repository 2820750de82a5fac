//! Telemetry: structured logging and metric descriptions.
//!
//! # Example
//!
//! ```rust,no_run
//! use warden_core::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default()).expect("Failed to initialize telemetry");
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::{init_logging, LogFormat, LoggingConfig};
pub use self::metrics::describe_metrics;

use serde::Deserialize;

/// Unified telemetry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TelemetryConfig {
    pub fn new(logging: LoggingConfig) -> Self {
        Self { logging }
    }
}

/// Initialize logging and describe metrics. Call once at startup.
///
/// # Errors
///
/// Returns an error if the logging subscriber cannot be installed.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    describe_metrics();
    init_logging(&config.logging)?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Telemetry initialized");
    Ok(())
}
