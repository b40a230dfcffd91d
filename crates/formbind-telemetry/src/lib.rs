//! Logging setup for formbind.
//!
//! Installs a `tracing-subscriber` pipeline with an `EnvFilter` and either
//! JSON or human-readable output, so the binder's `formbind` events can be
//! switched on per service.
//!
//! # Example
//!
//! ```rust,ignore
//! use formbind_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), formbind_telemetry::TelemetryError> {
//!     init_logging(&LogConfig::production().binder_level("debug"))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, BINDER_TARGET};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
