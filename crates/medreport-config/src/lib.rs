//! Configuration for the medical report analyzer
//!
//! Settings come from an optional TOML file overlaid with `MEDREPORT__*`
//! environment variables, then get validated before use.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{ApiConfig, AppConfig, HealthConfig, LoggingConfig};
