//! HTTP client implementation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Method, RequestBuilder, Response,
};
use tracing::debug;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
};

/// Mockable HTTP client trait
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// Execute a GET request
    async fn get(&self, url: &str) -> Result<Response>;

    /// Execute a POST request carrying a multipart form
    async fn post_multipart(&self, url: &str, form: Form) -> Result<Response>;
}

/// Production HTTP client
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn builder(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let url = url
            .parse::<url::Url>()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        Ok(self.inner.request(method, url))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(HttpError::RequestFailed)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(HttpError::HttpStatus {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get(&self, url: &str) -> Result<Response> {
        debug!("HTTP GET: {}", url);
        let request = self.builder(Method::GET, url)?;
        self.send(request).await
    }

    async fn post_multipart(&self, url: &str, form: Form) -> Result<Response> {
        debug!("HTTP POST (multipart): {}", url);
        let request = self.builder(Method::POST, url)?.multipart(form);
        self.send(request).await
    }
}

/// Build the form part for an uploaded file
pub fn file_part(contents: Vec<u8>, file_name: &str, mime_type: &str) -> Result<Part> {
    Part::bytes(contents)
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .map_err(|e| HttpError::InvalidPart(format!("{mime_type}: {e}")))
}

/// Create a shared HTTP client (Arc-wrapped for cloning)
pub fn shared_client(config: HttpConfig) -> Result<Arc<dyn HttpClientTrait>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
