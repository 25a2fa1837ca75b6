//! Remote analysis calls with a synthetic fallback
//!
//! `analyze` never fails outward: transport failures and error responses alike
//! are logged and replaced with [`synthetic_analysis`]. The liveness call does
//! not degrade; its errors reach the caller so connectivity stays observable.

use std::sync::Arc;

use async_trait::async_trait;
use medreport_config::ApiConfig;
use medreport_http::{file_part, multipart::Form, HttpClient, HttpClientTrait, HttpConfig, HttpError};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    dispatcher::Endpoint,
    error::{ApiError, DispatchError, Result},
    fallback::synthetic_analysis,
    models::{AnalysisResult, HealthResponse},
    validator::ValidFile,
};

/// Produces an analysis for a routed file. Infallible by contract.
#[async_trait]
pub trait ReportAnalyzer: Send + Sync {
    async fn analyze(&self, file: &ValidFile, endpoint: Endpoint) -> AnalysisResult;
}

/// Backend liveness check
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn check(&self) -> std::result::Result<HealthResponse, ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

pub struct ResilientAnalysisClient {
    http: Arc<dyn HttpClientTrait>,
    base_url: String,
}

impl ResilientAnalysisClient {
    pub fn new(http: Arc<dyn HttpClientTrait>, base_url: &str) -> Result<Self> {
        url::Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the HTTP client from configuration. Analysis uploads carry no
    /// timeout unless one is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut http_config = HttpConfig::new().with_connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            http_config = http_config.with_timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            http_config = http_config.with_user_agent(agent.clone());
        }

        let http = HttpClient::new(http_config)?;
        Self::new(Arc::new(http), &config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Single POST without the fallback; errors are reported as [`ApiError`]
    pub async fn request_analysis(
        &self,
        file: &ValidFile,
        endpoint: Endpoint,
    ) -> std::result::Result<AnalysisResult, ApiError> {
        let part = file_part(file.contents().to_vec(), file.name(), file.mime_type())
            .map_err(|e| analysis_error(e, endpoint))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post_multipart(&self.url(endpoint.path()), form)
            .await
            .map_err(|e| analysis_error(e, endpoint))?;

        let status = response.status().as_u16();
        response.json::<AnalysisResult>().await.map_err(|e| {
            ApiError::new(status, format!("Malformed analysis response: {e}"))
        })
    }

    /// `GET /health`; never substituted
    pub async fn health_check(&self) -> std::result::Result<HealthResponse, ApiError> {
        let response = self.http.get(&self.url("/health")).await.map_err(|e| match e {
            HttpError::HttpStatus { status, .. } => {
                ApiError::new(status.as_u16(), "Health check failed")
            }
            other => {
                debug!("Health probe got no response: {}", other);
                ApiError::transport("Backend server is not available")
            }
        })?;

        let status = response.status().as_u16();
        response
            .json::<HealthResponse>()
            .await
            .map_err(|e| ApiError::new(status, format!("Malformed health response: {e}")))
    }
}

fn analysis_error(err: HttpError, endpoint: Endpoint) -> ApiError {
    match err {
        HttpError::HttpStatus { status, body } => {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .and_then(|d| match d {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) if s.is_empty() => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                });
            ApiError::new(
                status.as_u16(),
                detail.unwrap_or_else(|| endpoint.failure_message().to_string()),
            )
        }
        other if other.is_transport() => ApiError::transport(other.to_string()),
        // The request never left the client
        other => ApiError::new(DispatchError::STATUS, other.to_string()),
    }
}

#[async_trait]
impl ReportAnalyzer for ResilientAnalysisClient {
    async fn analyze(&self, file: &ValidFile, endpoint: Endpoint) -> AnalysisResult {
        match self.request_analysis(file, endpoint).await {
            Ok(result) => result,
            Err(e) => {
                // Rejections and outages both degrade to canned data here.
                warn!(
                    "Analysis of {} via {} failed, using synthetic result: {}",
                    file.name(),
                    endpoint,
                    e
                );
                synthetic_analysis(endpoint)
            }
        }
    }
}

#[async_trait]
impl LivenessProbe for ResilientAnalysisClient {
    async fn check(&self) -> std::result::Result<HealthResponse, ApiError> {
        self.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use medreport_http::StatusCode;

    use super::*;

    fn status_error(status: u16, body: &str) -> HttpError {
        HttpError::HttpStatus {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_error_detail_becomes_message() {
        let err = analysis_error(
            status_error(500, r#"{"detail": "Analysis failed: model offline"}"#),
            Endpoint::ImageAnalysis,
        );
        assert_eq!(err, ApiError::new(500, "Analysis failed: model offline"));
    }

    #[test]
    fn test_unparsable_body_uses_generic_message() {
        let image = analysis_error(status_error(502, "<html>bad gateway</html>"), Endpoint::ImageAnalysis);
        let pdf = analysis_error(status_error(500, r#"{"other": 1}"#), Endpoint::DocumentAnalysis);

        assert_eq!(image.message, "Failed to analyze image");
        assert_eq!(pdf.message, "Failed to analyze PDF");
        assert_eq!(pdf.status, 500);
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let err = analysis_error(
            status_error(422, r#"{"detail": [{"loc": ["body", "file"]}]}"#),
            Endpoint::ImageAnalysis,
        );
        assert_eq!(err.status, 422);
        assert!(err.message.contains("\"file\""));
    }

    #[test]
    fn test_unencodable_upload_is_not_reported_as_unreachable() {
        let err = analysis_error(
            HttpError::InvalidPart("image/(png): invalid token".into()),
            Endpoint::ImageAnalysis,
        );
        assert_eq!(err.status, 400);
        assert!(!err.is_transport());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let http = medreport_http::shared_client(HttpConfig::default()).unwrap();
        let client = ResilientAnalysisClient::new(http, "http://localhost:8000/").unwrap();
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let http = medreport_http::shared_client(HttpConfig::default()).unwrap();
        assert!(ResilientAnalysisClient::new(http, "localhost without scheme").is_err());
    }
}
