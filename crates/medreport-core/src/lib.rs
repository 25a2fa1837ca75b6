//! Client-side orchestration for the medical report analyzer
//!
//! A selected file flows through [`validator`] (type and size), [`dispatcher`]
//! (image vs document operation) and [`client`] (upload, decode, synthetic
//! fallback) while [`session`] tracks the outcome. [`health`] polls backend
//! liveness on its own schedule and gates uploads.
//!
//! ```no_run
//! # async fn run() -> medreport_core::Result<()> {
//! use medreport_config::AppConfig;
//! use medreport_core::{Application, UploadedFile};
//!
//! let mut app = Application::start(AppConfig::default())?;
//! let file = UploadedFile::from_path("chest-xray.png").await.expect("readable file");
//! app.submit(file).await.ok();
//! if let Some(result) = app.session().result() {
//!     println!("{}", result.summary);
//! }
//! app.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod fallback;
pub mod health;
pub mod logging;
pub mod models;
pub mod session;
pub mod validator;

pub use app::{Application, ConnectionBanner};
pub use client::{LivenessProbe, ReportAnalyzer, ResilientAnalysisClient};
pub use dispatcher::{dispatch, Endpoint};
pub use display::{ConfidenceDisplay, ConfidenceLevel};
pub use error::{ApiError, CoreError, DispatchError, Result, SessionError, ValidationError};
pub use fallback::{synthetic_analysis, SYNTHETIC_CONFIDENCE};
pub use health::{HealthMonitor, HealthMonitorConfig, HealthSnapshot, HealthStatus, MonitorHandle};
pub use logging::init_tracing;
pub use models::{AnalysisResult, ComplexTerms, HealthResponse, UploadedFile};
pub use session::{AnalysisSession, AnalysisTicket, Applied, SessionEvent, SessionState};
pub use validator::{validate, FileValidator, ValidFile, ACCEPTED_MIME_TYPES, MAX_FILE_SIZE};
