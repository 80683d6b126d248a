//! Main configuration types.
//!
//! This module provides the top-level [`SextantConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use sextant_core::{Settings, StaticSettings, DEFAULT_MAX_BODY_SIZE};

use crate::{ConfigError, LoggingSection};

/// Complete Sextant configuration.
///
/// Implements [`Settings`], so it can be handed to the application builder
/// directly. Use
/// [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use sextant_config::SextantConfig;
/// use sextant_core::Settings;
///
/// let config = SextantConfig::default();
/// assert!(!config.debug());
/// assert_eq!(config.max_body_size(), 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SextantConfig {
    /// Include diagnostics in error responses.
    #[serde(default)]
    pub debug: bool,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: u64,

    /// Route resolution cache capacity; `0` disables the cache.
    #[serde(default = "default_route_cache_capacity")]
    pub route_cache_capacity: usize,

    /// View module locations, carried for the host.
    #[serde(default)]
    pub views: Vec<String>,

    /// Middleware module locations, carried for the host.
    #[serde(default)]
    pub middlewares: Vec<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl Default for SextantConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_body_size: default_max_body_size(),
            route_cache_capacity: default_route_cache_capacity(),
            views: Vec::new(),
            middlewares: Vec::new(),
            logging: LoggingSection::default(),
        }
    }
}

impl SextantConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use sextant_config::SextantConfig;
    ///
    /// let config = SextantConfig::builder()
    ///     .debug(true)
    ///     .max_body_size(1024)
    ///     .build();
    ///
    /// assert!(config.debug);
    /// assert_eq!(config.max_body_size, 1024);
    /// ```
    #[must_use]
    pub fn builder() -> SextantConfigBuilder {
        SextantConfigBuilder::new()
    }

    /// Development preset: debug output and pretty debug-level logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            debug: true,
            logging: LoggingSection {
                level: "debug".to_string(),
                format: sextant_telemetry::LogFormat::Pretty,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: no diagnostics, JSON logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `max_body_size` is zero
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "max_body_size",
                "must be greater than zero",
            ));
        }

        if let Err(e) = sextant_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }
}

impl Settings for SextantConfig {
    fn debug(&self) -> bool {
        self.debug
    }

    fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    fn route_cache_capacity(&self) -> usize {
        self.route_cache_capacity
    }

    fn views(&self) -> &[String] {
        &self.views
    }

    fn middlewares(&self) -> &[String] {
        &self.middlewares
    }
}

/// Builder for [`SextantConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct SextantConfigBuilder {
    config: SextantConfig,
}

impl SextantConfigBuilder {
    /// Create a builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Set the body size limit.
    pub fn max_body_size(mut self, bytes: u64) -> Self {
        self.config.max_body_size = bytes;
        self
    }

    /// Set the route cache capacity.
    pub fn route_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.route_cache_capacity = capacity;
        self
    }

    /// Add a view location.
    pub fn view(mut self, location: impl Into<String>) -> Self {
        self.config.views.push(location.into());
        self
    }

    /// Add a middleware location.
    pub fn middleware(mut self, location: impl Into<String>) -> Self {
        self.config.middlewares.push(location.into());
        self
    }

    /// Set the logging section.
    pub fn logging(mut self, logging: LoggingSection) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SextantConfig {
        self.config
    }
}

const fn default_max_body_size() -> u64 {
    DEFAULT_MAX_BODY_SIZE
}

fn default_route_cache_capacity() -> usize {
    StaticSettings::default().route_cache_capacity
}
