//! Configuration sections.

use serde::{Deserialize, Serialize};
use sextant_telemetry::{LogConfig, LogFormat};

/// Logging configuration section.
///
/// ```toml
/// [logging]
/// level = "sextant=debug,info"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Service name attached to log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            service_name: default_service_name(),
        }
    }
}

impl LoggingSection {
    /// Builds the telemetry crate's logging configuration from this section.
    ///
    /// Starts from the preset matching the format: pretty output uses the
    /// development preset, everything else the production one.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json | LogFormat::Compact => LogConfig::production(),
        };
        LogConfig {
            enabled: self.enabled,
            ..base
        }
        .with_level(self.level.clone())
        .with_format(self.format)
        .with_service_name(self.service_name.clone())
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "sextant".to_string()
}
