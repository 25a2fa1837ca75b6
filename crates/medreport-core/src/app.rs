//! Wires the client, health monitor and session for the lifetime of the app

use std::sync::Arc;

use medreport_config::AppConfig;
use tokio::runtime::Handle;
use tracing::info;

use crate::{
    client::ResilientAnalysisClient,
    error::{CoreError, Result, SessionError},
    health::{HealthMonitor, HealthMonitorConfig, HealthSnapshot, MonitorHandle},
    logging::init_tracing,
    models::UploadedFile,
    session::{AnalysisSession, Applied},
};

/// Status line and optional hint for the connection banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBanner {
    pub label: &'static str,
    pub hint: Option<String>,
}

pub struct Application {
    config: AppConfig,
    client: Arc<ResilientAnalysisClient>,
    monitor: Arc<HealthMonitor>,
    monitor_handle: MonitorHandle,
    session: AnalysisSession,
}

impl Application {
    /// Install logging, build the client, start polling and open an Idle
    /// session. Fails with [`CoreError::NoRuntime`] outside a Tokio runtime.
    pub fn start(config: AppConfig) -> Result<Self> {
        Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        init_tracing(&config.logging);

        let client = Arc::new(ResilientAnalysisClient::from_config(&config.api)?);
        let monitor = Arc::new(HealthMonitor::new(
            client.clone(),
            HealthMonitorConfig::from(&config.health),
        ));
        let monitor_handle = Arc::clone(&monitor).start();
        let session = AnalysisSession::new(monitor.subscribe());

        info!("Application started against {}", client.base_url());
        Ok(Self {
            config,
            client,
            monitor,
            monitor_handle,
            session,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &ResilientAnalysisClient {
        &self.client
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AnalysisSession {
        &mut self.session
    }

    pub fn health(&self) -> HealthSnapshot {
        self.monitor.snapshot()
    }

    pub fn connection_banner(&self) -> ConnectionBanner {
        let status = self.monitor.status();
        ConnectionBanner {
            label: status.label(),
            hint: status.hint(self.client.base_url()),
        }
    }

    /// Run a selected file through the session
    pub async fn submit(&mut self, file: UploadedFile) -> std::result::Result<Applied, SessionError> {
        self.session.analyze_file(file, self.client.as_ref()).await
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Stop polling. In-flight work is not cancelled.
    pub fn shutdown(self) {
        self.monitor_handle.stop();
        info!("Application stopped");
    }
}
