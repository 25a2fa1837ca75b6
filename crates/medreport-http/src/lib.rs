//! HTTP transport for the medical report analyzer
//!
//! Thin, mockable layer over `reqwest` shared by the analysis client and the
//! liveness probe.
//!
//! ## Features
//!
//! - **Trait-based design**: Mockable via `HttpClientTrait`
//! - **Multipart uploads**: Single-field file forms for the analysis endpoints
//! - **Configurable**: Optional request timeout, connect timeout, user-agent
//! - **Retry middleware**: Fixed or growing delays over any `Retryable` error

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;

pub use client::{file_part, shared_client, HttpClient, HttpClientTrait};
pub use config::HttpConfig;
pub use error::{HttpError, Result};
pub use middleware::{RetryConfig, RetryMiddleware, Retryable};

/// Re-export commonly used types
pub use reqwest::{multipart, Response, StatusCode};
