//! HTTP client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout; `None` lets a request run until the server answers
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whole-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// Default value functions for serde
fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("MedReport/{}", env!("CARGO_PKG_VERSION"))
}
