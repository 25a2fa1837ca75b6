//! Configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote analysis service
    pub api: ApiConfig,
    /// Liveness polling
    pub health: HealthConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Remote analysis service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/analyze/*` and `/health` paths are joined onto
    pub base_url: String,
    /// Whole-request timeout for analysis uploads; unset means no timeout
    pub request_timeout_ms: Option<u64>,
    /// TCP connect timeout
    pub connect_timeout_ms: u64,
    /// User-agent override
    pub user_agent: Option<String>,
}

/// Liveness probe settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Time between probe rounds
    pub interval_ms: u64,
    /// Retries after a failed probe before reporting Disconnected
    pub max_retries: u32,
    /// Spacing between retries
    pub retry_delay_ms: u64,
    /// Upper bound on a single probe attempt
    pub probe_timeout_ms: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info,medreport_core=debug`
    pub filter: String,
    /// Colored output
    pub ansi: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: None,
            connect_timeout_ms: 10_000,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            probe_timeout_ms: 5_000,
        }
    }
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}
