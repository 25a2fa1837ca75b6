//! End-to-end scenarios: file selection through to the session outcome,
//! plus liveness gating, against a mock analysis backend.

use std::{net::TcpListener, time::Duration};

use medreport_config::{ApiConfig, AppConfig, HealthConfig};
use medreport_core::{
    init_tracing, AnalysisResult, AnalysisSession, Application, Applied, HealthStatus,
    ResilientAnalysisClient, SessionError, SessionState, UploadedFile, ValidationError,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const MIB: usize = 1024 * 1024;

fn config_for(base_url: &str, health: HealthConfig) -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        },
        health,
        ..Default::default()
    }
}

fn fast_health() -> HealthConfig {
    HealthConfig {
        retry_delay_ms: 10,
        probe_timeout_ms: 1_000,
        ..Default::default()
    }
}

/// Base URL of a port nothing listens on
fn closed_port_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn wait_for_status(app: &Application, wanted: HealthStatus) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.health().status != wanted {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("health status never reached");
}

#[tokio::test]
async fn scenario_png_with_healthy_backend_succeeds_with_remote_fields() {
    let body = json!({
        "success": true,
        "summary": "Chest X-ray shows no acute abnormality.",
        "key_findings": ["No consolidation", "Normal heart size", "No effusion"],
        "lifestyle_recommendations": ["Stay active"],
        "precautions": ["Seek care if breathless"],
        "confidence_score": 0.91,
        "complex_terms": {"Consolidation": "Lung tissue filled with fluid", "Effusion": "Fluid around the lungs"}
    });
    let expected: AnalysisResult = serde_json::from_value(body.clone()).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "message": "ok"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = Application::start(config_for(&server.uri(), HealthConfig::default())).unwrap();
    assert!(!init_tracing(&app.config().logging), "start installs the subscriber");
    let file = UploadedFile::new("chest-xray.png", "image/png", vec![0u8; 2 * MIB]);

    let applied = app.submit(file).await.unwrap();

    assert_eq!(applied, Applied::Current);
    match app.session().state() {
        SessionState::Succeeded { file, result } => {
            assert_eq!(file.name(), "chest-xray.png");
            assert_eq!(result, &expected);
        }
        other => panic!("unexpected state: {other:?}"),
    }

    app.reset();
    assert_eq!(app.session().state(), &SessionState::Idle);
    assert!(app.session().current_file().is_none());
    app.shutdown();
}

#[tokio::test]
async fn scenario_text_file_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ResilientAnalysisClient::from_config(&ApiConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    let mut session = AnalysisSession::detached();

    let err = session
        .analyze_file(UploadedFile::new("notes.txt", "text/plain", b"bp 120/80".to_vec()), &client)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::UnsupportedType { .. })
    ));
    assert_eq!(session.state(), &SessionState::Idle);
}

#[tokio::test]
async fn scenario_pdf_with_unreachable_backend_gets_synthetic_result() {
    let client = ResilientAnalysisClient::from_config(&ApiConfig {
        base_url: closed_port_uri(),
        ..Default::default()
    })
    .unwrap();
    assert!(client.health_check().await.unwrap_err().is_transport());
    let mut session = AnalysisSession::detached();

    let file = UploadedFile::new("report.pdf", "application/pdf", b"%PDF-1.4 lab panel".to_vec());
    session.analyze_file(file, &client).await.unwrap();

    let result = session.result().expect("session succeeded");
    assert!(result.success);
    assert!(result.summary.contains("mock analysis for pdf file"));
    assert_eq!(result.confidence_score, 85.0);
}

#[tokio::test]
async fn scenario_oversized_jpeg_rejected() {
    let mut session = AnalysisSession::detached();
    let file = UploadedFile::new("scan.jpg", "image/jpeg", vec![0u8; 12 * MIB]);

    let err = session.select_file(file).unwrap_err();

    assert_eq!(
        err,
        SessionError::Validation(ValidationError::TooLarge {
            size: (12 * MIB) as u64,
            limit: (10 * MIB) as u64,
        })
    );
    assert_eq!(session.state(), &SessionState::Idle);
}

#[tokio::test]
async fn scenario_unreachable_health_disables_upload() {
    let base_url = closed_port_uri();
    let mut app = Application::start(config_for(&base_url, fast_health())).unwrap();

    wait_for_status(&app, HealthStatus::Disconnected).await;

    assert!(!app.session().upload_enabled());
    let banner = app.connection_banner();
    assert_eq!(banner.label, "Backend Disconnected");
    assert!(banner.hint.unwrap().contains(&base_url));
    assert!(app.health().last_error.unwrap().is_transport());

    let file = UploadedFile::new("chest-xray.png", "image/png", vec![0u8; 64]);
    assert_eq!(app.submit(file).await.unwrap_err(), SessionError::UploadDisabled);
    app.shutdown();
}

#[tokio::test]
async fn scenario_failing_health_probed_four_times_before_disconnect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let app = Application::start(config_for(&server.uri(), fast_health())).unwrap();
    wait_for_status(&app, HealthStatus::Disconnected).await;

    assert_eq!(app.health().last_error.unwrap().status, 500);
    app.shutdown();
    server.verify().await;
}
