//! HTTP transport seam
//!
//! The session only needs "send a request, get status and body back, or a
//! connection error". `HttpTransport` does that with reqwest; tests swap in
//! a mock.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

use crate::error::{ApiError, ConfigError, Result};

/// Request timeout for every call to the CMDB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method used by the CMDB API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/x-www-form-urlencoded` pairs, in order
    Form(Vec<(String, String)>),
    /// JSON document
    Json(Value),
}

/// One request to the CMDB, relative to the transport's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub body: Body,
    /// Bearer token, attached as `Authorization: Bearer <token>`
    pub bearer: Option<String>,
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can carry a request to the CMDB and bring back the response
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Connection-level failures are `ApiError::Network`.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport bound to one base URL
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        reqwest::Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("url '{}': {}", base_url, e)))?;

        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        log::debug!("{:?} {}", request.method, url);

        let builder = match request.method {
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
        };
        let builder = match &request.body {
            Body::Form(pairs) => builder.form(pairs),
            Body::Json(value) => builder.json(value),
        };
        let builder = match &request.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}
