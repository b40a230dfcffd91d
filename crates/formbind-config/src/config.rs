//! Main configuration types.
//!
//! This module provides the top-level [`FormbindConfig`] struct, its builder,
//! and conversions into the runtime settings of the binder and the logger.

use serde::{Deserialize, Serialize};

use formbind::{BinderConfig, MultipartConfig};
use formbind_telemetry::LogConfig;

use crate::{BindingConfig, ConfigError, LogFormat, LoggingConfig, MultipartLimits};

/// Complete formbind configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use formbind_config::FormbindConfig;
///
/// let config = FormbindConfig::default();
/// assert!(config.binding.json_suffix);
/// assert_eq!(config.multipart.max_fields, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct FormbindConfig {
    /// Binding behavior.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Request body limits.
    #[serde(default)]
    pub multipart: MultipartLimits,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FormbindConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use formbind_config::{FormbindConfig, MultipartLimits};
    ///
    /// let config = FormbindConfig::builder()
    ///     .multipart(MultipartLimits {
    ///         max_fields: 10,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.multipart.max_fields, 10);
    /// ```
    #[must_use]
    pub fn builder() -> FormbindConfigBuilder {
        FormbindConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - Any body limit is zero
    /// - The per-field limit exceeds the body limit
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.multipart;
        for (field, value) in [
            ("multipart.max_memory_bytes", limits.max_memory_bytes),
            ("multipart.max_body_bytes", limits.max_body_bytes),
            ("multipart.max_field_bytes", limits.max_field_bytes),
            ("multipart.max_fields", limits.max_fields),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_value(field, "must be greater than 0"));
            }
        }

        if limits.max_field_bytes > limits.max_body_bytes {
            return Err(ConfigError::invalid_value(
                "multipart.max_field_bytes",
                format!(
                    "{} exceeds multipart.max_body_bytes ({})",
                    limits.max_field_bytes, limits.max_body_bytes
                ),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty colored logs at `debug`, with the binder's per-field decisions
    /// visible at `trace`.
    ///
    /// # Example
    ///
    /// ```
    /// use formbind_config::FormbindConfig;
    ///
    /// let config = FormbindConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.binder_level = Some("trace".to_string());
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at `info` and a tighter in-memory upload budget.
    ///
    /// # Example
    ///
    /// ```
    /// use formbind_config::FormbindConfig;
    ///
    /// let config = FormbindConfig::production();
    /// assert_eq!(config.logging.format, formbind_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.multipart.max_memory_bytes = 8 << 20;

        config
    }

    /// Returns the binder settings described by this configuration.
    ///
    /// ```
    /// use formbind_config::FormbindConfig;
    ///
    /// let binder = FormbindConfig::production().binder_config();
    /// assert_eq!(binder.multipart.max_memory, 8 << 20);
    /// ```
    #[must_use]
    pub fn binder_config(&self) -> BinderConfig {
        let limits = &self.multipart;
        BinderConfig::new()
            .json_suffix(self.binding.json_suffix)
            .multipart(
                MultipartConfig::new()
                    .max_memory(limits.max_memory_bytes)
                    .max_body_size(limits.max_body_bytes)
                    .max_field_size(limits.max_field_bytes)
                    .max_fields(limits.max_fields),
            )
    }

    /// Returns the logging settings described by this configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let logging = &self.logging;
        LogConfig {
            enabled: logging.enabled,
            level: logging.level.clone(),
            binder_level: logging.binder_level.clone(),
            json_format: logging.format == LogFormat::Json,
            file_line_info: logging.include_location,
            include_target: true,
            ansi: logging.ansi_enabled,
        }
    }
}

/// Builder for [`FormbindConfig`].
#[derive(Debug, Default)]
pub struct FormbindConfigBuilder {
    binding: Option<BindingConfig>,
    multipart: Option<MultipartLimits>,
    logging: Option<LoggingConfig>,
}

impl FormbindConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding section.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Set the multipart limits section.
    #[must_use]
    pub fn multipart(mut self, multipart: MultipartLimits) -> Self {
        self.multipart = Some(multipart);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration, filling unset sections with defaults.
    #[must_use]
    pub fn build(self) -> FormbindConfig {
        FormbindConfig {
            binding: self.binding.unwrap_or_default(),
            multipart: self.multipart.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
