//! Client configuration parsed from environment variables.
//!
//! Resolved once per process; nothing mutates a `ClientConfig` after
//! construction.

use std::path::PathBuf;

use crate::error::ClientError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_ME_PATH: &str = "/me";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the API, without a trailing slash.
    pub base_url: String,
    /// Current-user endpoint. Deployments disagree on `/me` vs `/api/me`.
    pub me_path: String,
    /// Navigation target after logout or a 401.
    pub login_path: String,
    /// Persisted token slot.
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FLASHPAPER_API_BASE`: default `http://localhost:8080`
    /// - `FLASHPAPER_ME_PATH`: default `/me`
    /// - `FLASHPAPER_LOGIN_PATH`: default `/auth/login`
    /// - `FLASHPAPER_TOKEN_FILE`: default `$HOME/.flashpaper/token`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] or [`ClientError::Config`] when a
    /// value is present but malformed.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&env_or("FLASHPAPER_API_BASE", DEFAULT_API_BASE))?;
        let me_path = parse_path("FLASHPAPER_ME_PATH", &env_or("FLASHPAPER_ME_PATH", DEFAULT_ME_PATH))?;
        let login_path =
            parse_path("FLASHPAPER_LOGIN_PATH", &env_or("FLASHPAPER_LOGIN_PATH", DEFAULT_LOGIN_PATH))?;
        let token_file = std::env::var_os("FLASHPAPER_TOKEN_FILE")
            .filter(|v| !v.is_empty())
            .map_or_else(default_token_file, PathBuf::from);

        Ok(Self { base_url, me_path, login_path, token_file })
    }

    /// Config pointing at `base_url` with every other field at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not http(s).
    pub fn for_base_url(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            me_path: DEFAULT_ME_PATH.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            token_file: default_token_file(),
        })
    }
}

/// `$HOME/.flashpaper/token`, or a relative `.flashpaper/token` without `HOME`.
#[must_use]
pub fn default_token_file() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".flashpaper").join(TOKEN_FILE_NAME)
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_path(key: &str, raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(ClientError::Config(format!("{key} must start with '/': {raw}")));
    }
    Ok(trimmed.to_owned())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
