//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{ConfigError, FormbindConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use formbind_config::ConfigLoader;
///
/// # fn main() -> Result<(), formbind_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("formbind.toml")?
///     .with_env_prefix("FORMBIND")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: FormbindConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FormbindConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = FormbindConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use formbind_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.binder_level.as_deref(), Some("trace"));
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = FormbindConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = FormbindConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats.
    /// The file format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// `format` is `"toml"` or `"json"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use formbind_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [multipart]
    ///     max_fields = 20
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.multipart.max_fields, 20);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, for
    /// example `FORMBIND__MULTIPART__MAX_FIELDS=20`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
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
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<FormbindConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without validation or environment overrides.
    #[must_use]
    pub fn load_unvalidated(self) -> FormbindConfig {
        self.config
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<FormbindConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["BINDING", "JSON_SUFFIX"] => config.binding.json_suffix = parse_bool(key, value)?,

            ["MULTIPART", "MAX_MEMORY_BYTES"] => {
                config.multipart.max_memory_bytes = parse_number(key, value)?;
            }
            ["MULTIPART", "MAX_BODY_BYTES"] => {
                config.multipart.max_body_bytes = parse_number(key, value)?;
            }
            ["MULTIPART", "MAX_FIELD_BYTES"] => {
                config.multipart.max_field_bytes = parse_number(key, value)?;
            }
            ["MULTIPART", "MAX_FIELDS"] => config.multipart.max_fields = parse_number(key, value)?,

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "BINDER_LEVEL"] => {
                config.logging.binder_level = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_bool(key, value)?;
            }
            ["LOGGING", "ANSI_ENABLED"] => config.logging.ansi_enabled = parse_bool(key, value)?,

            // Unknown keys are ignored so unrelated settings can share the prefix
            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, FormbindConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);

        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.multipart.max_memory_bytes, 8 << 20);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"binding": {"json_suffix": false}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.binding.json_suffix);
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        assert!(ConfigLoader::new().with_string("", "yaml").is_err());
    }

    #[test]
    fn test_loader_unknown_section_rejected() {
        let toml = r"
            [server]
            port = 8080
        ";
        assert!(ConfigLoader::new().with_string(toml, "toml").is_err());
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [multipart]
            max_memory_bytes = 4096
            max_fields = 5

            [logging]
            level = "warn"
            binder_level = "debug"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.multipart.max_memory_bytes, 4096);
        assert_eq!(config.multipart.max_fields, 5);
        assert_eq!(config.multipart.max_body_bytes, 50 * 1024 * 1024);
        assert_eq!(config.log_config().filter_directive(), "warn,formbind=debug");
    }

    #[test]
    fn test_loader_with_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(ConfigLoader::new().with_file(file.path()).is_err());
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/formbind.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/formbind.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config, FormbindConfig::default());
    }

    #[test]
    fn test_loader_validation_runs_on_load() {
        let toml = r"
            [multipart]
            max_fields = 0
        ";
        let loader = ConfigLoader::new().with_string(toml, "toml").unwrap();
        assert!(loader.load().is_err());

        let loader = ConfigLoader::new().with_string(toml, "toml").unwrap();
        assert_eq!(loader.load_unvalidated().multipart.max_fields, 0);
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "True", "1", "yes", "on"] {
            assert!(parse_bool("K", value).unwrap());
        }
        for value in ["false", "FALSE", "0", "no", "off"] {
            assert!(!parse_bool("K", value).unwrap());
        }
        assert!(parse_bool("K", "maybe").is_err());
    }

    // Environment variables are not set in tests: `set_var` needs unsafe
    // under the 2024 edition and the workspace forbids unsafe code.

    #[test]
    fn test_apply_env_var_multipart() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__MULTIPART__MAX_MEMORY_BYTES", "1024", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__MULTIPART__MAX_FIELDS", "7", "TEST")
            .unwrap();
        assert_eq!(loader.config.multipart.max_memory_bytes, 1024);
        assert_eq!(loader.config.multipart.max_fields, 7);
    }

    #[test]
    fn test_apply_env_var_binding_and_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__BINDING__JSON_SUFFIX", "off", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__BINDER_LEVEL", "trace", "TEST")
            .unwrap();

        assert!(!loader.config.binding.json_suffix);
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert_eq!(loader.config.logging.binder_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__MULTIPART__MAX_FIELDS", "many", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
        assert!(loader.apply_env_var("OTHER__LOGGING__LEVEL", "x", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "80", "TEST").unwrap();
        assert_eq!(loader.config, FormbindConfig::default());
    }
}
