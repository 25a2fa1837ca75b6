//! Analysis session state machine
//!
//! `Idle -> Uploading -> Analyzing -> Succeeded`, with `Failed` reachable only
//! when routing refuses a validated file. Every selection and reset bumps a
//! generation counter; a completion carrying an older generation is dropped.

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    client::ReportAnalyzer,
    dispatcher::{dispatch, Endpoint},
    error::{ApiError, SessionError, ValidationError},
    health::{HealthSnapshot, HealthStatus},
    models::{AnalysisResult, UploadedFile},
    validator::{FileValidator, ValidFile},
};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Uploading(ValidFile),
    Analyzing(ValidFile),
    Succeeded {
        file: ValidFile,
        result: AnalysisResult,
    },
    Failed {
        file: ValidFile,
        error: ApiError,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Uploading(_) => "uploading",
            SessionState::Analyzing(_) => "analyzing",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// Notifications for the toast/notice collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ValidationRejected(ValidationError),
    AnalysisStarted { file_name: String, endpoint: Endpoint },
    AnalysisCompleted { file_name: String },
    AnalysisFailed(ApiError),
    Reset,
}

/// Work order for one in-flight analysis
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    file: ValidFile,
    endpoint: Endpoint,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file(&self) -> &ValidFile {
        &self.file
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

/// Whether a completion was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    /// The session was reset or moved on before the result arrived
    Stale,
}

pub struct AnalysisSession {
    state: SessionState,
    generation: u64,
    validator: FileValidator,
    health: watch::Receiver<HealthSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl AnalysisSession {
    /// New Idle session gated on `health`
    pub fn new(health: watch::Receiver<HealthSnapshot>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: SessionState::Idle,
            generation: 0,
            validator: FileValidator::default(),
            health,
            events,
        }
    }

    /// Session with no monitor attached; health stays Pending
    pub fn detached() -> Self {
        let (_tx, rx) = watch::channel(HealthSnapshot::default());
        Self::new(rx)
    }

    pub fn with_validator(mut self, validator: FileValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health.borrow().status
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uploading(_) | SessionState::Analyzing(_)
        )
    }

    /// False while disconnected or while a request is in flight
    pub fn upload_enabled(&self) -> bool {
        self.health_status().allows_upload() && !self.is_busy()
    }

    /// File currently held, if any
    pub fn current_file(&self) -> Option<&UploadedFile> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Uploading(file)
            | SessionState::Analyzing(file)
            | SessionState::Succeeded { file, .. }
            | SessionState::Failed { file, .. } => Some(&**file),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Validate and route a newly selected file.
    ///
    /// A refused selection leaves the state untouched. Selecting from
    /// Succeeded or Failed discards the previous outcome first.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<AnalysisTicket, SessionError> {
        if self.is_busy() {
            warn!("Ignoring selection of {} while busy", file.name());
            return Err(SessionError::Busy);
        }
        if !self.health_status().allows_upload() {
            return Err(SessionError::UploadDisabled);
        }

        let file = match self.validator.validate(file) {
            Ok(file) => file,
            Err(e) => {
                info!("Rejected selected file: {}", e);
                self.publish(SessionEvent::ValidationRejected(e.clone()));
                return Err(e.into());
            }
        };

        if !matches!(self.state, SessionState::Idle) {
            self.reset();
        }

        self.generation += 1;
        self.transition(SessionState::Uploading(file.clone()));

        match dispatch(&file) {
            Ok(endpoint) => {
                self.transition(SessionState::Analyzing(file.clone()));
                self.publish(SessionEvent::AnalysisStarted {
                    file_name: file.name().to_string(),
                    endpoint,
                });
                Ok(AnalysisTicket {
                    generation: self.generation,
                    file,
                    endpoint,
                })
            }
            Err(e) => {
                let error = ApiError::from(e.clone());
                self.transition(SessionState::Failed {
                    file,
                    error: error.clone(),
                });
                self.publish(SessionEvent::AnalysisFailed(error));
                Err(e.into())
            }
        }
    }

    /// Apply a finished analysis if `ticket` still belongs to the current run
    pub fn complete(&mut self, ticket: AnalysisTicket, result: AnalysisResult) -> Applied {
        let current = ticket.generation == self.generation
            && matches!(self.state, SessionState::Analyzing(_));
        if !current {
            debug!(
                "Dropping stale result for {} (generation {} vs {})",
                ticket.file.name(),
                ticket.generation,
                self.generation
            );
            return Applied::Stale;
        }

        let file_name = ticket.file.name().to_string();
        self.transition(SessionState::Succeeded {
            file: ticket.file,
            result,
        });
        self.publish(SessionEvent::AnalysisCompleted { file_name });
        Applied::Current
    }

    /// Select, analyze and complete in one step
    pub async fn analyze_file<A>(
        &mut self,
        file: UploadedFile,
        analyzer: &A,
    ) -> Result<Applied, SessionError>
    where
        A: ReportAnalyzer + ?Sized,
    {
        let ticket = self.select_file(file)?;
        let result = analyzer.analyze(ticket.file(), ticket.endpoint()).await;
        Ok(self.complete(ticket, result))
    }

    /// Back to Idle, discarding file and result; outstanding tickets go stale
    pub fn reset(&mut self) {
        self.generation += 1;
        self.transition(SessionState::Idle);
        self.publish(SessionEvent::Reset);
    }

    fn transition(&mut self, next: SessionState) {
        info!("Session: {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{fallback::synthetic_analysis, validator::MAX_FILE_SIZE};

    struct CannedAnalyzer;

    #[async_trait]
    impl ReportAnalyzer for CannedAnalyzer {
        async fn analyze(&self, _file: &ValidFile, endpoint: Endpoint) -> AnalysisResult {
            synthetic_analysis(endpoint)
        }
    }

    fn png() -> UploadedFile {
        UploadedFile::new("chest-xray.png", "image/png", vec![0u8; 16])
    }

    fn health_cell(status: HealthStatus) -> (watch::Sender<HealthSnapshot>, watch::Receiver<HealthSnapshot>) {
        watch::channel(HealthSnapshot {
            status,
            ..Default::default()
        })
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = AnalysisSession::detached();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.health_status(), HealthStatus::Pending);
        assert!(session.upload_enabled());
        assert!(session.current_file().is_none());
    }

    #[test]
    fn test_valid_selection_moves_to_analyzing() {
        let mut session = AnalysisSession::detached();
        let mut events = session.subscribe_events();

        let ticket = session.select_file(png()).unwrap();

        assert_eq!(ticket.endpoint(), Endpoint::ImageAnalysis);
        assert!(matches!(session.state(), SessionState::Analyzing(_)));
        assert_eq!(session.current_file().unwrap().name(), "chest-xray.png");
        assert!(!session.upload_enabled());
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::AnalysisStarted {
                file_name: "chest-xray.png".into(),
                endpoint: Endpoint::ImageAnalysis
            }
        );
    }

    #[test]
    fn test_invalid_selection_keeps_idle() {
        let mut session = AnalysisSession::detached();
        let mut events = session.subscribe_events();

        let err = session
            .select_file(UploadedFile::new("notes.txt", "text/plain", b"hi".to_vec()))
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::UnsupportedType { .. })
        ));
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.generation(), 0);
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::ValidationRejected(_)
        ));
    }

    #[test]
    fn test_oversized_selection_rejected() {
        let mut session = AnalysisSession::detached();
        let big = UploadedFile::new("scan.jpg", "image/jpeg", vec![0u8; (MAX_FILE_SIZE + 1) as usize]);

        assert!(matches!(
            session.select_file(big),
            Err(SessionError::Validation(ValidationError::TooLarge { .. }))
        ));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_selection_while_busy_refused() {
        let mut session = AnalysisSession::detached();
        let _ticket = session.select_file(png()).unwrap();

        assert_eq!(session.select_file(png()).unwrap_err(), SessionError::Busy);
        assert!(matches!(session.state(), SessionState::Analyzing(_)));
    }

    #[test]
    fn test_upload_disabled_while_disconnected() {
        let (tx, rx) = health_cell(HealthStatus::Disconnected);
        let mut session = AnalysisSession::new(rx);

        assert!(!session.upload_enabled());
        assert_eq!(session.select_file(png()).unwrap_err(), SessionError::UploadDisabled);
        assert_eq!(session.state(), &SessionState::Idle);

        tx.send_replace(HealthSnapshot {
            status: HealthStatus::Connected,
            ..Default::default()
        });
        assert!(session.upload_enabled());
        assert!(session.select_file(png()).is_ok());
    }

    #[test]
    fn test_complete_applies_current_ticket() {
        let mut session = AnalysisSession::detached();
        let ticket = session.select_file(png()).unwrap();
        let result = synthetic_analysis(ticket.endpoint());

        assert_eq!(session.complete(ticket, result.clone()), Applied::Current);
        assert_eq!(session.result(), Some(&result));
        assert!(session.upload_enabled());
    }

    #[test]
    fn test_result_after_reset_is_ignored() {
        let mut session = AnalysisSession::detached();
        let ticket = session.select_file(png()).unwrap();

        session.reset();
        let applied = session.complete(ticket.clone(), synthetic_analysis(ticket.endpoint()));

        assert_eq!(applied, Applied::Stale);
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_older_ticket_cannot_land_on_newer_run() {
        let mut session = AnalysisSession::detached();
        let first = session.select_file(png()).unwrap();
        session.reset();
        let second = session.select_file(png()).unwrap();

        assert_eq!(session.complete(first, synthetic_analysis(Endpoint::ImageAnalysis)), Applied::Stale);
        assert!(matches!(session.state(), SessionState::Analyzing(_)));
        assert_eq!(session.complete(second, synthetic_analysis(Endpoint::ImageAnalysis)), Applied::Current);
    }

    #[test]
    fn test_routing_refusal_fails_session() {
        // A validator that lets through a type routing has no operation for
        let validator = FileValidator::new(["text/plain"], MAX_FILE_SIZE);
        let mut session = AnalysisSession::detached().with_validator(validator);

        let err = session
            .select_file(UploadedFile::new("notes.txt", "text/plain", b"x".to_vec()))
            .unwrap_err();

        assert!(matches!(err, SessionError::Dispatch(_)));
        assert_eq!(session.error(), Some(&ApiError::new(400, "Unsupported file type")));
        assert!(session.current_file().is_some());
    }

    #[tokio::test]
    async fn test_reset_from_succeeded_and_failed() {
        let mut session = AnalysisSession::detached();
        session.analyze_file(png(), &CannedAnalyzer).await.unwrap();
        assert!(matches!(session.state(), SessionState::Succeeded { .. }));

        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.current_file().is_none());
        assert!(session.result().is_none());

        let mut session = AnalysisSession::detached()
            .with_validator(FileValidator::new(["text/plain"], MAX_FILE_SIZE));
        let _ = session.select_file(UploadedFile::new("a.txt", "text/plain", b"x".to_vec()));
        assert!(matches!(session.state(), SessionState::Failed { .. }));

        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.current_file().is_none());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_new_selection_after_success_replaces_outcome() {
        let mut session = AnalysisSession::detached();
        session.analyze_file(png(), &CannedAnalyzer).await.unwrap();

        let pdf = UploadedFile::new("report.pdf", "application/pdf", b"%PDF".to_vec());
        let ticket = session.select_file(pdf).unwrap();

        assert_eq!(ticket.endpoint(), Endpoint::DocumentAnalysis);
        assert!(session.result().is_none());
        assert_eq!(session.current_file().unwrap().name(), "report.pdf");
    }

    #[tokio::test]
    async fn test_analyze_file_emits_completion() {
        let mut session = AnalysisSession::detached();
        let mut events = session.subscribe_events();

        let applied = session.analyze_file(png(), &CannedAnalyzer).await.unwrap();

        assert_eq!(applied, Applied::Current);
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::AnalysisStarted { .. }));
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::AnalysisCompleted {
                file_name: "chest-xray.png".into()
            }
        );
    }
}
