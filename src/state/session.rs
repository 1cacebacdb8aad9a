//! Session lifecycle: register, login, profile fetch, logout, startup restore.
//!
//! SYSTEM CONTEXT
//! ==============
//! The (token, user) pair moves through three phases:
//!
//! ```text
//!   Anonymous --login--> TokenOnly --fetch_user ok--> Authenticated
//!       ^                    |                              |
//!       +---- fetch_user failure / 401 / logout ------------+
//! ```
//!
//! A failed profile fetch always drops all the way back to Anonymous; there
//! is no retry. The 401 interceptor in [`ApiClient`] and the fallback in
//! [`SessionStore::fetch_user`] both clear the session; clearing twice is
//! harmless.
//!
//! ERROR HANDLING
//! ==============
//! `login` does not error on `success: false`; it returns the resulting
//! [`SessionPhase`] and callers check it. `fetch_user` never errors: it
//! reports what it did as a [`FetchOutcome`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;

use super::auth::{AuthState, SessionContext, SessionPhase};
use crate::config::{ClientConfig, DEFAULT_ME_PATH};
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{ApiResponse, Credentials, LoginData, User};

pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Logged in successfully";

/// What [`SessionStore::fetch_user`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No token: no request was made and nothing changed.
    Skipped,
    /// Profile loaded.
    Loaded,
    /// The fetch failed; token and profile were cleared.
    Cleared,
    /// The token was cleared or replaced while the request was in flight.
    /// The response was discarded and the session left as it is.
    Superseded,
}

pub struct SessionStore {
    api: Arc<ApiClient>,
    me_path: String,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, me_path: &str) -> Self {
        Self { api, me_path: me_path.to_owned() }
    }

    #[must_use]
    pub fn from_config(api: Arc<ApiClient>, config: &ClientConfig) -> Self {
        Self::new(api, &config.me_path)
    }

    /// Store using the default `/me` profile endpoint.
    #[must_use]
    pub fn with_default_paths(api: Arc<ApiClient>) -> Self {
        Self::new(api, DEFAULT_ME_PATH)
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    #[must_use]
    pub fn context(&self) -> &Arc<SessionContext> {
        self.api.session()
    }

    pub async fn state(&self) -> AuthState {
        self.context().snapshot().await
    }

    pub async fn user(&self) -> Option<User> {
        self.context().user().await
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Whatever the request produced, unchanged.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let body = serde_json::to_value(credentials)?;
        self.api
            .send(Method::POST, REGISTER_ENDPOINT, HeaderMap::new(), Some(body))
            .await?;
        tracing::info!(email = %credentials.email, "registration accepted");
        Ok(())
    }

    /// Exchange credentials for a token, then load the profile.
    ///
    /// A `success: false` body (or one without a token) leaves the session
    /// as it was and still returns `Ok`; check the returned phase.
    ///
    /// # Errors
    ///
    /// Whatever the login request produced, unchanged.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionPhase, ClientError> {
        let response: ApiResponse<LoginData> = self.api.post_json(LOGIN_ENDPOINT, credentials).await?;
        let server_error = response.error.clone();
        match response.into_data().map(|d| d.token).filter(|t| !t.is_empty()) {
            Some(token) => {
                self.context().set_token(token).await;
                tracing::info!(email = %credentials.email, "login accepted");
                self.fetch_user().await;
            }
            None => {
                tracing::warn!(email = %credentials.email, error = ?server_error, "login did not return a token");
            }
        }
        let phase = self.context().phase().await;
        if phase == SessionPhase::Authenticated {
            self.api.notifier().success(LOGIN_SUCCESS_MESSAGE);
        }
        Ok(phase)
    }

    /// Load the profile for the current token.
    pub async fn fetch_user(&self) -> FetchOutcome {
        let ctx = self.context();
        let Some(token) = ctx.token().await else {
            return FetchOutcome::Skipped;
        };

        let result = {
            let _loading = LoadingGuard::start(ctx);
            self.api.get_json::<ApiResponse<User>>(&self.me_path).await
        };

        match result.map(ApiResponse::into_data) {
            Ok(Some(user)) => {
                let user_id = user.id.clone();
                if !ctx.set_user_for_token(&token, user).await {
                    tracing::debug!(path = %self.me_path, "session changed during profile fetch; discarding profile");
                    return FetchOutcome::Superseded;
                }
                tracing::debug!(%user_id, "profile loaded");
                FetchOutcome::Loaded
            }
            failed => {
                // A newer login owns the slot now; its session is not ours to clear.
                if ctx.token().await.is_some_and(|current| current != token) {
                    tracing::debug!(path = %self.me_path, "session replaced during profile fetch; keeping it");
                    return FetchOutcome::Superseded;
                }
                match failed {
                    Err(e) => tracing::warn!(
                        error = %e,
                        code = e.error_code(),
                        path = %self.me_path,
                        "profile fetch failed; clearing session"
                    ),
                    _ => tracing::warn!(path = %self.me_path, "profile fetch reported failure; clearing session"),
                }
                ctx.clear().await;
                FetchOutcome::Cleared
            }
        }
    }

    /// Drop the session locally and go to the login route. No server call.
    pub async fn logout(&self) {
        self.context().clear().await;
        tracing::info!("logged out");
        self.api.navigator().navigate(self.api.login_path());
    }

    /// Run once at startup: a token restored from storage without a profile
    /// triggers exactly one profile fetch.
    pub async fn init_auth(&self) -> SessionPhase {
        let ctx = self.context();
        if ctx.token().await.is_some() && ctx.user().await.is_none() {
            self.fetch_user().await;
        }
        ctx.phase().await
    }

    /// Route guard: restore the session, then return the profile or send the
    /// user to the login route once loading has settled without one.
    pub async fn require_user(&self) -> Option<User> {
        self.init_auth().await;
        let state = self.state().await;
        if state.should_redirect_unauth() {
            self.api.navigator().navigate(self.api.login_path());
            return None;
        }
        state.user
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("api", &self.api)
            .field("me_path", &self.me_path)
            .finish()
    }
}

/// Holds `loading` true until dropped, including when the fetch future is
/// dropped mid-flight.
struct LoadingGuard<'a>(&'a SessionContext);

impl<'a> LoadingGuard<'a> {
    fn start(ctx: &'a SessionContext) -> Self {
        ctx.set_loading(true);
        Self(ctx)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}
