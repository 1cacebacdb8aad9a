//! Client errors and the error-message normalizer.
//!
//! DESIGN
//! ======
//! Every fallible operation returns `Result<T, ClientError>`. Presentation
//! code never inspects variants directly: it converts the error into an
//! [`ErrorInfo`] and asks [`parse_error`] for a display string. Untyped error
//! payloads (raw JSON bodies, foreign error shapes) take the same road via
//! [`ErrorInfo::from_value`], so both paths share one resolution order:
//! server-supplied `error`, then a generic message, then the fallback.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Message shown when nothing more specific can be extracted.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Message surfaced to the user when a request comes back 401.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API client and session operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connect failure, reset, TLS, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered 401. The session has already been cleared.
    #[error("unauthorized")]
    Unauthorized { server_error: Option<String> },

    /// The server answered with a non-2xx status other than 401.
    #[error("HTTP {status}")]
    Http { status: u16, server_error: Option<String>, body: String },

    /// A 2xx response carried `success: false`.
    #[error("request rejected by server")]
    Rejected { server_error: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured base address could not be used.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A header value (usually the bearer token) was not valid ASCII.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The persisted token slot could not be read or written.
    #[error("token storage failed: {0}")]
    TokenStorage(#[from] std::io::Error),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ClientError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Http { .. } => "E_HTTP",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidBaseUrl(_) => "E_INVALID_BASE_URL",
            Self::InvalidHeader(_) => "E_INVALID_HEADER",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::TokenStorage(_) => "E_TOKEN_STORAGE",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// HTTP status attached to the error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the server put in the response envelope's `error` field.
    #[must_use]
    pub fn server_error(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { server_error } | Self::Http { server_error, .. } | Self::Rejected { server_error } => {
                server_error.as_deref()
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

// =============================================================================
// NORMALIZER
// =============================================================================

/// Normalized error shape consumed by [`parse_error`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub status: Option<u16>,
    /// Server-supplied message; wins over everything else.
    pub server_error: Option<String>,
    /// Generic message (the error's own description).
    pub message: Option<String>,
}

impl ErrorInfo {
    /// Info carrying only a generic message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self { message: non_empty(message.into()), ..Self::default() }
    }

    /// Extract an `ErrorInfo` from an arbitrary JSON error shape.
    ///
    /// Recognizes `response._data.error`, a top-level `error` string (a raw
    /// envelope) and a top-level `message`. Missing or mistyped fields at
    /// any depth are treated as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let response = value.get("response");
        let nested = response
            .and_then(|r| r.get("_data"))
            .and_then(|d| d.get("error"))
            .and_then(Value::as_str);
        let envelope = value.get("error").and_then(Value::as_str);
        let status = response
            .and_then(|r| r.get("status"))
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());

        Self {
            status,
            server_error: nested.or(envelope).map(str::to_owned).and_then(non_empty),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .and_then(non_empty),
        }
    }
}

impl From<&ClientError> for ErrorInfo {
    fn from(err: &ClientError) -> Self {
        Self {
            status: err.status(),
            server_error: err.server_error().map(str::to_owned).and_then(non_empty),
            message: non_empty(err.to_string()),
        }
    }
}

impl From<&Value> for ErrorInfo {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

/// Resolve a human-readable message: server error, then message, then `fallback`.
pub fn parse_error(error: impl Into<ErrorInfo>, fallback: &str) -> String {
    let info = error.into();
    info.server_error
        .or(info.message)
        .unwrap_or_else(|| fallback.to_owned())
}

/// [`parse_error`] with [`DEFAULT_ERROR_MESSAGE`] as the fallback.
pub fn parse_error_or_default(error: impl Into<ErrorInfo>) -> String {
    parse_error(error, DEFAULT_ERROR_MESSAGE)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
