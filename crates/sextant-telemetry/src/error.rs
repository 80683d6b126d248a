//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The log level or filter directive did not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// The log format name is unknown.
    #[error("Unknown log format '{0}', expected json, pretty or compact")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::UnknownFormat("xml".to_string());
        assert!(err.to_string().contains("'xml'"));
    }
}
