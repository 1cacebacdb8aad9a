//! Auth-session state shared by the request interceptor and the session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionContext` per application, created at the root and handed to
//! every collaborator as `Arc<SessionContext>`. The API client reads the
//! token from it before each request and clears it on a 401; the session
//! store owns the user profile. Nothing locks across operations: two
//! overlapping logins race and the last write wins.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::token::TokenStore;
use crate::net::types::User;

/// Where the (token, user) pair currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token, no user.
    Anonymous,
    /// Token present, profile not (yet) loaded.
    TokenOnly,
    /// Token and profile both present.
    Authenticated,
}

/// Point-in-time copy of the session for rendering decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token_present: bool,
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (self.token_present, self.user.is_some()) {
            (false, _) => SessionPhase::Anonymous,
            (true, false) => SessionPhase::TokenOnly,
            (true, true) => SessionPhase::Authenticated,
        }
    }

    /// Route guards send the user to login once loading settles with no profile.
    #[must_use]
    pub fn should_redirect_unauth(&self) -> bool {
        !self.loading && self.user.is_none()
    }
}

pub struct SessionContext {
    token: Arc<dyn TokenStore>,
    user: RwLock<Option<User>>,
    loading: AtomicBool,
}

impl SessionContext {
    #[must_use]
    pub fn new(token: Arc<dyn TokenStore>) -> Self {
        Self { token, user: RwLock::new(None), loading: AtomicBool::new(false) }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.get().await
    }

    pub async fn set_token(&self, token: String) {
        self.token.set(token).await;
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn set_user(&self, user: User) {
        *self.user.write().await = Some(user);
    }

    /// Install `user` only while `token` is still the current token.
    ///
    /// Holds the profile lock across the token check; `clear` takes that lock
    /// first, so a clear cannot slip in between check and install.
    pub async fn set_user_for_token(&self, token: &str, user: User) -> bool {
        let mut slot = self.user.write().await;
        if self.token.get().await.as_deref() != Some(token) {
            return false;
        }
        *slot = Some(user);
        true
    }

    /// Reset to anonymous: profile first, then token, so a reader never sees
    /// a profile without a token. Idempotent.
    pub async fn clear(&self) {
        *self.user.write().await = None;
        self.token.clear().await;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> AuthState {
        AuthState {
            token_present: self.token().await.is_some(),
            user: self.user().await,
            loading: self.is_loading(),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.snapshot().await.phase()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
