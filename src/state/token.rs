//! Credential token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token is the single source of truth for "are requests authenticated".
//! It outlives the in-memory session: [`FileTokenStore`] keeps it on disk so a
//! restarted process picks it up again, the way a browser cookie survives a
//! reload. An empty token is the same as no token.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::ClientError;

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, `None` when logged out.
    async fn get(&self) -> Option<String>;

    /// Replace the token. An empty or blank value clears the slot.
    async fn set(&self, token: String);

    /// Clear the slot. Clearing an empty slot is a no-op.
    async fn clear(&self);
}

#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

fn normalize(token: String) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == token.len() {
        Some(token)
    } else {
        Some(trimmed.to_owned())
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local slot; forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled as if restored from an earlier run.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { slot: RwLock::new(normalize(token.into())) }
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    async fn set(&self, token: String) {
        *self.slot.write().await = normalize(token);
    }

    async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Slot persisted to a single file holding the bare token.
///
/// The in-memory copy is authoritative for the running process. Writes go
/// through to disk on every change; a failed write is logged and the memory
/// copy still changes, so a 401 always logs the process out even when the
/// disk is read-only.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    slot: RwLock<Option<String>>,
}

impl FileTokenStore {
    /// Open the slot at `path`, loading any token left by a previous run.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TokenStorage`] if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let token = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => normalize(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ClientError::TokenStorage(e)),
        };
        tracing::debug!(path = %path.display(), restored = token.is_some(), "token slot opened");
        Ok(Self { path, slot: RwLock::new(token) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the token and report whether it reached the disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TokenStorage`] if the file cannot be written or removed.
    /// The in-memory slot is updated either way.
    pub async fn persist(&self, token: Option<String>) -> Result<(), ClientError> {
        let mut slot = self.slot.write().await;
        *slot = token.and_then(normalize);
        match slot.as_deref() {
            Some(token) => write_token_file(&self.path, token).await?,
            None => remove_token_file(&self.path).await?,
        }
        Ok(())
    }

    async fn persist_logged(&self, token: Option<String>) {
        if let Err(e) = self.persist(token).await {
            tracing::warn!(error = %e, path = %self.path.display(), "token slot write failed; keeping in-memory value");
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    async fn set(&self, token: String) {
        self.persist_logged(Some(token)).await;
    }

    async fn clear(&self) {
        self.persist_logged(None).await;
    }
}

/// The file is created owner-only and an existing one is tightened while
/// still empty, so the token is never on disk with wider permissions.
async fn write_token_file(path: &Path, token: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(TOKEN_FILE_MODE);
    let mut file = options.open(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(TOKEN_FILE_MODE)).await?;
    }
    file.write_all(format!("{token}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

async fn remove_token_file(path: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
