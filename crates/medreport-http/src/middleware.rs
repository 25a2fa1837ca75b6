//! Retry middleware for HTTP operations

use std::{fmt::Display, future::Future, time::Duration};

use tracing::{debug, warn};

/// Errors that can tell whether another attempt is worthwhile
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = max_attempts + 1)
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 = fixed delay)
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Fixed spacing between retries
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
        }
    }

    /// Calculate delay for given attempt number
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        std::cmp::min(delay, self.max_delay)
    }
}

/// Retry middleware for fallible async operations
#[derive(Debug, Clone)]
pub struct RetryMiddleware {
    config: RetryConfig,
}

impl RetryMiddleware {
    /// Create new retry middleware
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute operation with retry logic.
    ///
    /// Non-retryable errors return immediately. Once retries are exhausted the
    /// last error is returned unchanged so callers can still inspect it.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Request succeeded after {attempt} retries");
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        debug!("Non-retryable error: {e}");
                        return Err(e);
                    }

                    if attempt >= self.config.max_attempts {
                        warn!("Giving up after {} attempts: {}", attempt + 1, e);
                        return Err(e);
                    }

                    let delay = self.config.calculate_delay(attempt);
                    warn!(
                        "Request failed (retry {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.config.max_attempts,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
