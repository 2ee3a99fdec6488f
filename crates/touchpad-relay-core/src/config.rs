//! Relay configuration loaded from TOML.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

/// Logging settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Destination device settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Overrides the device name from the recording.
    #[serde(default)]
    pub name: Option<String>,
}

/// Axis mapping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Warn when source resolution is below this multiple of the
    /// destination resolution.
    #[serde(default = "default_min_sampling_ratio")]
    pub min_sampling_ratio: u32,
    /// Emit a diagnostic record for every rescaled event.
    #[serde(default = "default_true")]
    pub log_events: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            min_sampling_ratio: default_min_sampling_ratio(),
            log_events: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_sampling_ratio() -> u32 {
    2
}

fn default_true() -> bool {
    true
}
