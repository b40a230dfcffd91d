//! Structured logging for formbind services.
//!
//! The binder emits `debug` and `trace` events under the `formbind` target
//! (JSON decoding, tolerated form parse failures, the path taken for each
//! field). This module installs a `tracing-subscriber` pipeline that prints
//! them as JSON lines or in a human-readable layout.
//!
//! # Example
//!
//! ```rust,ignore
//! use formbind_telemetry::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::development().binder_level("trace");
//! init_logging(&config)?;
//!
//! tracing::info!(route = "/upload", "Binding request");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Target used by the binder's events.
pub const BINDER_TARGET: &str = "formbind";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Base filter directive (e.g., "info", "warn,my_app=debug").
    pub level: String,

    /// Level for the binder's own events, appended as `formbind=<level>`.
    pub binder_level: Option<String>,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Whether to emit ANSI colors in the human-readable layout.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            binder_level: None,
            json_format: true,
            file_line_info: false,
            include_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Sets the level for the binder's events.
    #[must_use]
    pub fn binder_level(mut self, level: impl Into<String>) -> Self {
        self.binder_level = Some(level.into());
        self
    }

    /// Returns the full filter directive.
    ///
    /// ```rust
    /// use formbind_telemetry::LogConfig;
    ///
    /// let config = LogConfig::default().binder_level("trace");
    /// assert_eq!(config.filter_directive(), "info,formbind=trace");
    /// ```
    #[must_use]
    pub fn filter_directive(&self) -> String {
        match &self.binder_level {
            Some(level) => format!("{},{BINDER_TARGET}={level}", self.level),
            None => self.level.clone(),
        }
    }
}

/// Initializes the global logging subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad directive and
/// `TelemetryError::LoggingInit` if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.filter_directive())?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
        assert_eq!(config.filter_directive(), "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.file_line_info);
        assert!(config.ansi);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_binder_level_directive() {
        let config = LogConfig::production().binder_level("debug");
        assert_eq!(config.filter_directive(), "info,formbind=debug");
        assert!(create_env_filter(&config.filter_directive()).is_ok());
    }

    #[test]
    fn test_create_env_filter_invalid() {
        let err = create_env_filter("formbind=loud").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_logging(&config).is_ok());
    }
}
