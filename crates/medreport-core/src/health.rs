//! Periodic backend liveness polling
//!
//! One status cell (a `watch` channel) written only by [`HealthMonitor`];
//! sessions and the connection banner read it.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use medreport_config::HealthConfig;
use medreport_http::{RetryConfig, RetryMiddleware};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{client::LivenessProbe, error::ApiError, models::HealthResponse};

/// Backend reachability as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    Connected,
    Disconnected,
    /// No probe round has finished yet
    #[default]
    Pending,
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Connected => "Backend Connected",
            HealthStatus::Disconnected => "Backend Disconnected",
            HealthStatus::Pending => "Connecting to Backend...",
        }
    }

    /// Upload is gated only on a confirmed disconnect
    pub fn allows_upload(&self) -> bool {
        *self != HealthStatus::Disconnected
    }

    /// Extra banner line shown while disconnected
    pub fn hint(&self, base_url: &str) -> Option<String> {
        match self {
            HealthStatus::Disconnected => Some(format!(
                "Please make sure the backend server is running at {base_url}"
            )),
            _ => None,
        }
    }
}

/// Latest probe outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub response: Option<HealthResponse>,
    pub last_error: Option<ApiError>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    fn connected(response: HealthResponse) -> Self {
        Self {
            status: HealthStatus::Connected,
            response: Some(response),
            last_error: None,
            checked_at: Some(Utc::now()),
        }
    }

    fn disconnected(error: ApiError) -> Self {
        Self {
            status: HealthStatus::Disconnected,
            response: None,
            last_error: Some(error),
            checked_at: Some(Utc::now()),
        }
    }
}

/// Probe cadence and retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct HealthMonitorConfig {
    pub interval: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self::from(&HealthConfig::default())
    }
}

impl From<&HealthConfig> for HealthMonitorConfig {
    fn from(config: &HealthConfig) -> Self {
        Self {
            interval: config.interval(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            probe_timeout: config.probe_timeout(),
        }
    }
}

pub struct HealthMonitor {
    probe: Arc<dyn LivenessProbe>,
    config: HealthMonitorConfig,
    retry: RetryMiddleware,
    status_tx: watch::Sender<HealthSnapshot>,
}

impl HealthMonitor {
    pub fn new(probe: Arc<dyn LivenessProbe>, config: HealthMonitorConfig) -> Self {
        let retry = RetryMiddleware::new(RetryConfig::fixed(config.max_retries, config.retry_delay));
        let (status_tx, _) = watch::channel(HealthSnapshot::default());

        Self {
            probe,
            config,
            retry,
            status_tx,
        }
    }

    pub fn config(&self) -> &HealthMonitorConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.status_tx.subscribe()
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.status_tx.borrow().clone()
    }

    pub fn status(&self) -> HealthStatus {
        self.status_tx.borrow().status
    }

    /// One probe round: the initial attempt plus up to `max_retries` retries
    /// spaced `retry_delay` apart. The status only changes once the round ends.
    pub async fn probe_now(&self) -> HealthStatus {
        let probe = &self.probe;
        let timeout = self.config.probe_timeout;

        let outcome = self
            .retry
            .execute(move || async move {
                match time::timeout(timeout, probe.check()).await {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::transport("Health check timed out")),
                }
            })
            .await;

        let snapshot = match outcome {
            Ok(response) => {
                debug!("Health probe ok: {} ({})", response.status, response.message);
                HealthSnapshot::connected(response)
            }
            Err(e) => HealthSnapshot::disconnected(e),
        };

        let status = snapshot.status;
        let previous = self.status_tx.send_replace(snapshot).status;
        if previous != status {
            match status {
                HealthStatus::Disconnected => error!(
                    "Backend unreachable after {} retries",
                    self.config.max_retries
                ),
                _ => info!("Backend status: {}", status.label()),
            }
        }

        status
    }

    /// Spawn the polling loop; the first round runs immediately.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let status = self.subscribe();
        let monitor = Arc::clone(&self);

        info!("Starting health monitor (every {:?})", self.config.interval);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(monitor.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                monitor.probe_now().await;
            }
        });

        MonitorHandle { task, status }
    }
}

/// Owns the polling task; dropping it stops polling
pub struct MonitorHandle {
    task: JoinHandle<()>,
    status: watch::Receiver<HealthSnapshot>,
}

impl MonitorHandle {
    pub fn status(&self) -> watch::Receiver<HealthSnapshot> {
        self.status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        if !self.task.is_finished() {
            info!("Stopping health monitor");
        }
        self.task.abort();
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
