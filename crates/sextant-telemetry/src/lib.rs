//! # Sextant Telemetry
//!
//! Structured logging for Sextant applications, built on `tracing` and
//! `tracing-subscriber`.
//!
//! The dispatcher opens one span per request:
//!
//! ```text
//! request{request_id=… http.method=GET http.path=/users/7 route=/users/<id:int> stage=complete http.status_code=200}
//! ```
//!
//! Routing decisions and short-circuits log at `debug`, application errors
//! at `warn` (4xx) or `error` (5xx), and faults at `error` with their full
//! cause chain.
//!
//! # Example
//!
//! ```rust,no_run
//! use sextant_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig::development().with_format(LogFormat::Compact);
//! init_logging(&config).expect("logging");
//! ```

#![doc(html_root_url = "https://docs.rs/sextant-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
