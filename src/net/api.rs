//! Authenticated API client.
//!
//! DESIGN
//! ======
//! Every call to the remote API goes through [`ApiClient::send`], which runs
//! two interceptors around the transport:
//!
//! - request: read the token from the shared [`SessionContext`] and, if one
//!   is set, add `Authorization: Bearer <token>` on top of the caller's
//!   headers. No token means the request goes out unauthenticated.
//! - response: a 401 (exactly 401) clears the session, shows the
//!   session-expired toast and navigates to the login route before the error
//!   reaches the caller. Every other failure is returned untouched.
//!
//! ERROR HANDLING
//! ==============
//! No retries, no backoff, no refresh. Transport failures and non-401 HTTP
//! errors propagate as-is; mapping them to user text is the caller's job
//! (see [`crate::error::parse_error`]).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::types::ErrorEnvelope;
use crate::config::{ClientConfig, DEFAULT_LOGIN_PATH};
use crate::error::{ClientError, DEFAULT_ERROR_MESSAGE, ErrorInfo, SESSION_EXPIRED_MESSAGE, parse_error};
use crate::state::auth::SessionContext;
use crate::ui::{Navigator, NoopNavigator, NoopNotifier, Notifier};

const UNAUTHORIZED: u16 = 401;

pub struct ApiClient {
    base_url: String,
    login_path: String,
    session: Arc<SessionContext>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Client over `reqwest` for the configured base address.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(&config.base_url, session, transport).with_login_path(&config.login_path))
    }

    /// Client over an arbitrary transport. Notifier and navigator default to no-ops.
    #[must_use]
    pub fn with_transport(base_url: &str, session: Arc<SessionContext>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            session,
            transport,
            notifier: Arc::new(NoopNotifier),
            navigator: Arc::new(NoopNavigator),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: &str) -> Self {
        login_path.clone_into(&mut self.login_path);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    // =========================================================================
    // SEND
    // =========================================================================

    /// Issue a request through both interceptors.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Transport`] when no response arrives
    /// - [`ClientError::Unauthorized`] on 401, after the session was cleared
    /// - [`ClientError::Http`] on any other non-2xx status
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let request = self.prepare(method, path, headers, body).await?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.headers.contains_key(AUTHORIZATION),
            "api request"
        );
        let response = self.transport.execute(request).await.inspect_err(|e| {
            tracing::warn!(error = %e, %path, "api transport failed");
        })?;
        self.intercept_response(path, response).await
    }

    /// `GET` and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Any [`send`](Self::send) error, or [`ClientError::Decode`] for an unexpected body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(Method::GET, path, HeaderMap::new(), None).await?;
        decode(&response)
    }

    /// `POST` a JSON body and decode the response body as `T`.
    ///
    /// # Errors
    ///
    /// Any [`send`](Self::send) error, or [`ClientError::Decode`] for an unexpected body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, HeaderMap::new(), Some(body)).await?;
        decode(&response)
    }

    /// `DELETE` and decode the response body as `T`.
    ///
    /// # Errors
    ///
    /// Any [`send`](Self::send) error, or [`ClientError::Decode`] for an unexpected body.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(Method::DELETE, path, HeaderMap::new(), None).await?;
        decode(&response)
    }

    // =========================================================================
    // INTERCEPTORS
    // =========================================================================

    async fn prepare(
        &self,
        method: Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<serde_json::Value>,
    ) -> Result<HttpRequest, ClientError> {
        if let Some(token) = self.session.token().await {
            headers.insert(AUTHORIZATION, bearer_header(&token)?);
        }
        Ok(HttpRequest { method, url: self.url(path), headers, body })
    }

    async fn intercept_response(&self, path: &str, response: HttpResponse) -> Result<HttpResponse, ClientError> {
        if response.is_success() {
            return Ok(response);
        }

        let server_error = ErrorEnvelope::server_error(&response.body);
        if response.status == UNAUTHORIZED {
            tracing::info!(%path, "api returned 401; ending session");
            self.session.clear().await;
            self.notifier
                .error(&parse_error(ErrorInfo::with_message(SESSION_EXPIRED_MESSAGE), DEFAULT_ERROR_MESSAGE));
            self.navigator.navigate(&self.login_path);
            return Err(ClientError::Unauthorized { server_error });
        }

        tracing::debug!(status = response.status, %path, "api returned error status");
        Err(ClientError::Http { status: response.status, server_error, body: response.body })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ClientError> {
    Ok(serde_json::from_str(&response.body)?)
}
