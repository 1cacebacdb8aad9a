//! HTTP transport seam.
//!
//! `ApiClient` does all interception (bearer header, 401 handling) and hands
//! a fully-prepared request to a [`Transport`]. Production uses
//! [`ReqwestTransport`]; tests substitute a scripted mock.

use reqwest::Method;
use reqwest::header::HeaderMap;

use crate::error::ClientError;

/// A request after interception, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

/// Status and raw body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request. Returns `Err` only when no response was received.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

// =============================================================================
// REQWEST
// =============================================================================

/// [`Transport`] backed by a shared `reqwest::Client`.
///
/// No timeout is configured: a request runs until it completes or fails.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = self.http.request(request.method, &request.url).headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
