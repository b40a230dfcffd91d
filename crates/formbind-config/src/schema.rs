//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Binding behavior section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Treat `application/*+json` media types as JSON.
    #[serde(default = "default_true")]
    pub json_suffix: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            json_suffix: default_true(),
        }
    }
}

/// Request body limits section.
///
/// # Example
///
/// ```
/// use formbind_config::MultipartLimits;
///
/// let limits = MultipartLimits {
///     max_memory_bytes: 1024 * 1024,
///     ..Default::default()
/// };
/// assert_eq!(limits.max_fields, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MultipartLimits {
    /// Upload bytes kept in memory before spooling to a temporary file.
    #[serde(default = "default_max_memory")]
    pub max_memory_bytes: usize,

    /// Maximum request body size.
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,

    /// Maximum size of a single multipart field.
    #[serde(default = "default_max_field")]
    pub max_field_bytes: usize,

    /// Maximum number of multipart fields.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
}

impl Default for MultipartLimits {
    fn default() -> Self {
        Self {
            max_memory_bytes: default_max_memory(),
            max_body_bytes: default_max_body(),
            max_field_bytes: default_max_field(),
            max_fields: default_max_fields(),
        }
    }
}

fn default_max_memory() -> usize {
    formbind::multipart::DEFAULT_MAX_MEMORY
}

fn default_max_body() -> usize {
    formbind::multipart::DEFAULT_MAX_BODY_SIZE
}

fn default_max_field() -> usize {
    formbind::multipart::DEFAULT_MAX_FIELD_SIZE
}

fn default_max_fields() -> usize {
    100
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Level for the binder's own events.
    #[serde(default)]
    pub binder_level: Option<String>,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log records.
    #[serde(default)]
    pub include_location: bool,

    /// Colored output for the pretty format.
    #[serde(default)]
    pub ansi_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            binder_level: None,
            format: LogFormat::default(),
            include_location: false,
            ansi_enabled: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
