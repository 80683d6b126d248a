//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, SextantConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "SEXTANT";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON); keys absent from the file keep
///    their defaults
/// 3. Environment variables (`{PREFIX}_DEBUG`, `{PREFIX}_MAX_BODY_SIZE`,
///    `{PREFIX}_ROUTE_CACHE_CAPACITY`, `{PREFIX}_LOG_LEVEL`,
///    `{PREFIX}_LOG_FORMAT`)
///
/// # Example
///
/// ```no_run
/// use sextant_config::ConfigLoader;
///
/// # fn main() -> Result<(), sextant_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv()?
///     .with_optional_file("sextant.toml")?
///     .with_env_prefix("SEXTANT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SextantConfig,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SextantConfig::default(),
            env_prefix: None,
            env_vars: None,
        }
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use sextant_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.debug);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SextantConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SextantConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is picked from the extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.with_string(&content, &extension)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use sextant_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     debug = true
    ///
    ///     [logging]
    ///     format = "compact"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.debug);
    /// assert_eq!(config.max_body_size, 10 * 1024 * 1024);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let file_config: SextantConfig = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        self.config = file_config;
        Ok(self)
    }

    /// Enable environment overrides with the given prefix.
    ///
    /// With prefix `"SEXTANT"` the loader reads `SEXTANT_DEBUG`,
    /// `SEXTANT_MAX_BODY_SIZE` and so on.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Read overrides from these variables instead of the process
    /// environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load a `.env` file from the current directory or its parents into
    /// the process environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<SextantConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars = match self.env_vars.take() {
                Some(vars) => vars,
                None => env::vars().collect(),
            };
            for (key, value) in &vars {
                self.apply_env_var(&prefix, key, value)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SextantConfig {
        self.config
    }

    fn apply_env_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let Some(name) = key
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
        else {
            return Ok(());
        };

        match name {
            "DEBUG" => {
                self.config.debug = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "MAX_BODY_SIZE" => {
                self.config.max_body_size = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            "ROUTE_CACHE_CAPACITY" => {
                self.config.route_cache_capacity = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            "LOG_LEVEL" => {
                self.config.logging.level = value.to_string();
            }
            "LOG_FORMAT" => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|_| {
                        ConfigError::env_parse_error(key, "expected 'json', 'pretty' or 'compact'")
                    })?;
            }
            // Other variables sharing the prefix belong to the host.
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_telemetry::LogFormat;
    use std::io::Write;

    fn file_with(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, SextantConfig::default());
    }

    #[test]
    fn test_toml_file() {
        let file = file_with(
            ".toml",
            r#"
                debug = true
                max_body_size = 2048
                views = ["app.views"]

                [logging]
                level = "warn"
            "#,
        );

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(config.debug);
        assert_eq!(config.max_body_size, 2048);
        assert_eq!(config.views, vec!["app.views"]);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.route_cache_capacity, 1024);
    }

    #[test]
    fn test_json_file() {
        let file = file_with(".json", r#"{"route_cache_capacity": 0}"#);
        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.route_cache_capacity, 0);
    }

    #[test]
    fn test_unknown_extension() {
        let file = file_with(".yaml", "debug: true");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .with_file("/definitely/not/here.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        assert!(ConfigLoader::new()
            .with_optional_file("/definitely/not/here.toml")
            .is_ok());
    }

    #[test]
    fn test_unknown_field_in_file() {
        let file = file_with(".toml", "max_body = 5");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = file_with(".toml", "debug = false\nmax_body_size = 100");
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .with_env_prefix("sextant")
            .with_env_vars([
                ("SEXTANT_DEBUG", "on"),
                ("SEXTANT_MAX_BODY_SIZE", "4096"),
                ("SEXTANT_LOG_FORMAT", "Pretty"),
                ("SEXTANT_UNRELATED", "ignored"),
                ("OTHER_DEBUG", "off"),
            ])
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.max_body_size, 4096);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_bad_env_values() {
        let err = ConfigLoader::new()
            .with_env_prefix("SEXTANT")
            .with_env_vars([("SEXTANT_DEBUG", "maybe")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));

        let err = ConfigLoader::new()
            .with_env_prefix("SEXTANT")
            .with_env_vars([("SEXTANT_LOG_FORMAT", "xml")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_env_validation_runs() {
        let err = ConfigLoader::new()
            .with_env_prefix("SEXTANT")
            .with_env_vars([("SEXTANT_MAX_BODY_SIZE", "0")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_env_vars_ignored_without_prefix() {
        let config = ConfigLoader::new()
            .with_env_vars([("SEXTANT_DEBUG", "true")])
            .load()
            .unwrap();
        assert!(!config.debug);
    }
}
