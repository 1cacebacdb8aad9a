//! Snippet endpoints on top of [`ApiClient`].
//!
//! All of these ride the same interceptors as the session calls, so an
//! expired token on any of them ends the session the same way.

#[cfg(test)]
#[path = "snippets_test.rs"]
mod snippets_test;

use uuid::Uuid;

use super::api::ApiClient;
use super::types::{
    ApiResponse, CreatedSnippet, DashboardStats, HealthStatus, NewSnippet, OverviewSnippet, PaginatedList,
    SnippetView,
};
use crate::error::ClientError;

pub const SNIPPETS_PATH: &str = "/snippets";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const HEALTH_PATH: &str = "/health";

fn snippet_path(id: Uuid) -> String {
    format!("{SNIPPETS_PATH}/{id}")
}

fn list_path(page: u32, limit: u32) -> String {
    format!("{SNIPPETS_PATH}?page={}&limit={}", page.max(1), limit.max(1))
}

impl ApiClient {
    /// `POST /snippets`. Works with or without a session; the server records
    /// the owner when a token is attached.
    ///
    /// # Errors
    ///
    /// Any request error, or [`ClientError::Rejected`] for `success: false`.
    pub async fn create_snippet(&self, snippet: &NewSnippet) -> Result<CreatedSnippet, ClientError> {
        let created = self
            .post_json::<_, ApiResponse<CreatedSnippet>>(SNIPPETS_PATH, snippet)
            .await?
            .into_result()?;
        tracing::info!(id = %created.id, max_views = created.max_views, "snippet created");
        Ok(created)
    }

    /// `GET /snippets/{id}`. Each call consumes one view server-side.
    ///
    /// # Errors
    ///
    /// Any request error; an expired, burnt or unknown snippet comes back as
    /// [`ClientError::Http`] with the server's message.
    pub async fn view_snippet(&self, id: Uuid) -> Result<SnippetView, ClientError> {
        let view = self
            .get_json::<ApiResponse<SnippetView>>(&snippet_path(id))
            .await?
            .into_result()?;
        tracing::debug!(%id, views_left = view.views_left, "snippet viewed");
        Ok(view)
    }

    /// `DELETE /snippets/{id}`. Owner only.
    ///
    /// # Errors
    ///
    /// Any request error, or [`ClientError::Rejected`] for `success: false`.
    pub async fn delete_snippet(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete_json::<ApiResponse<serde_json::Value>>(&snippet_path(id))
            .await?
            .into_result()?;
        tracing::info!(%id, "snippet deleted");
        Ok(())
    }

    /// `GET /snippets?page=&limit=`: the caller's active snippets. Page and
    /// limit are clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Any request error, or [`ClientError::Rejected`] for `success: false`.
    pub async fn list_snippets(&self, page: u32, limit: u32) -> Result<PaginatedList<OverviewSnippet>, ClientError> {
        self.get_json::<ApiResponse<PaginatedList<OverviewSnippet>>>(&list_path(page, limit))
            .await?
            .into_result()
    }

    /// `GET /dashboard`.
    ///
    /// # Errors
    ///
    /// Any request error, or [`ClientError::Rejected`] for `success: false`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.get_json::<ApiResponse<DashboardStats>>(DASHBOARD_PATH)
            .await?
            .into_result()
    }

    /// `GET /health`. The body is not enveloped.
    ///
    /// # Errors
    ///
    /// Any request error.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json(HEALTH_PATH).await
    }
}
