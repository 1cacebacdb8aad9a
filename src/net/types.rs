//! Wire DTOs for the snippet-sharing API.
//!
//! DESIGN
//! ======
//! Every endpoint answers with the same envelope (`ApiResponse<T>`):
//! `success` plus either `data`, a `message`, or an `error`. The envelope is
//! decoded leniently so that a `success: false` body on a 2xx status is data
//! for the caller to judge, never a decode failure.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ClientError;

// =============================================================================
// ENVELOPE
// =============================================================================

/// Response envelope shared by every endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// The payload when the server reported success, `None` otherwise.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }

    /// The payload, or [`ClientError::Rejected`] when the server reported
    /// failure or left `data` out.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] carrying the envelope's `error` field.
    pub fn into_result(self) -> Result<T, ClientError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ClientError::Rejected { server_error: self.error.filter(|e| !e.is_empty()) }),
        }
    }
}

/// Envelope with only the `error` field, used to mine error bodies.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorEnvelope {
    /// Pull the server's `error` string out of a raw body, if it has one.
    pub(crate) fn server_error(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|env| env.error)
            .filter(|e| !e.is_empty())
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Email/password pair sent to `/auth/register` and `/auth/login`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `data` payload of a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: String,
}

/// The authenticated user's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// SNIPPETS
// =============================================================================

/// Body of `POST /snippets`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewSnippet {
    pub content: String,
    pub title: String,
    pub language: String,
    pub max_views: u32,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// `data` payload of a successful snippet creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSnippet {
    pub id: Uuid,
    pub link: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub max_views: u32,
}

/// A snippet as returned by the burn-on-read view endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetView {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub language: String,
    pub views_left: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Row in the owner's active-snippet listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewSnippet {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub language: String,
    pub max_views: i64,
    pub current_views: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_snippets: i64,
    pub active_burnt_snippets: i64,
    pub total_views: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Body of `GET /health`. Not wrapped in the envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub codename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
