//! Typed configuration for formbind.
//!
//! This crate loads binder and logging settings with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`FormbindConfig`] has three sections:
//!
//! - [`BindingConfig`] - binder behavior (`+json` media type detection)
//! - [`MultipartLimits`] - request body and upload limits
//! - [`LoggingConfig`] - log level, format and the binder's own level
//!
//! [`FormbindConfig::binder_config`] and [`FormbindConfig::log_config`] turn a
//! loaded configuration into a `formbind::BinderConfig` and a
//! `formbind_telemetry::LogConfig`.
//!
//! # Example
//!
//! ```no_run
//! use formbind::Binder;
//! use formbind_config::ConfigLoader;
//!
//! # fn main() -> Result<(), formbind_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("formbind.toml")?
//!     .with_env_prefix("FORMBIND")
//!     .load()?;
//!
//! let binder = Binder::new(config.binder_config());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [binding]
//! json_suffix = true
//!
//! [multipart]
//! max_memory_bytes = 33554432
//! max_body_bytes = 52428800
//! max_field_bytes = 10485760
//! max_fields = 100
//!
//! [logging]
//! enabled = true
//! level = "info"
//! binder_level = "debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! All configuration values can be overridden via environment variables using
//! the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `FORMBIND__MULTIPART__MAX_MEMORY_BYTES=1048576`
//! - `FORMBIND__BINDING__JSON_SUFFIX=false`
//! - `FORMBIND__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
