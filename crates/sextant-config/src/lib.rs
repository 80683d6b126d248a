//! Typed configuration for Sextant.
//!
//! This crate loads [`SextantConfig`], which implements the core
//! [`Settings`](sextant_core::Settings) capability, with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use sextant_config::ConfigLoader;
//!
//! # fn main() -> Result<(), sextant_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("sextant.toml")?
//!     .with_env_prefix("SEXTANT")
//!     .load()?;
//!
//! sextant_telemetry::init_logging(&config.logging.to_log_config()).ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! debug = false
//! max_body_size = 10485760
//! route_cache_capacity = 1024
//! views = ["app.views.users"]
//! middlewares = ["app.middleware.auth"]
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! service_name = "my-service"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `SEXTANT_DEBUG=true`
//! - `SEXTANT_MAX_BODY_SIZE=1048576`
//! - `SEXTANT_ROUTE_CACHE_CAPACITY=0`
//! - `SEXTANT_LOG_LEVEL=sextant=debug,info`
//! - `SEXTANT_LOG_FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{SextantConfig, SextantConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::LoggingSection;
