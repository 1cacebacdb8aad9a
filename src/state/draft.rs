//! Snippet composition form state.
//!
//! Not persisted and unrelated to the session: logging out keeps the draft,
//! `clear` is the only reset.

#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use std::sync::{PoisonError, RwLock};

use crate::net::types::NewSnippet;

pub const DEFAULT_LANGUAGE: &str = "text";
pub const DEFAULT_MAX_VIEWS: u32 = 1;
pub const DEFAULT_EXPIRES_IN: u64 = 60;

/// Languages the server stores as-is. Anything else is stored as `text`.
pub const SUPPORTED_LANGUAGES: &[&str] = &["text", "go", "python", "javascript", "java", "html", "css", "sql"];

/// Map a requested language onto the supported set, case-insensitively.
#[must_use]
pub fn sanitize_language(language: &str) -> &'static str {
    let wanted = language.trim().to_ascii_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|lang| *lang == wanted)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Why a draft would be refused by the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("snippet content is empty")]
    EmptyContent,
    #[error("max views must be at least 1")]
    MaxViews,
    #[error("expiry must be at least 1 second")]
    ExpiresIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub content: String,
    pub title: String,
    pub language: String,
    pub max_views: u32,
    /// Seconds until expiry.
    pub expires_in: u64,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            content: String::new(),
            title: String::new(),
            language: DEFAULT_LANGUAGE.to_owned(),
            max_views: DEFAULT_MAX_VIEWS,
            expires_in: DEFAULT_EXPIRES_IN,
        }
    }
}

impl Draft {
    #[must_use]
    pub fn has_draft(&self) -> bool {
        !self.content.is_empty()
    }

    /// # Errors
    ///
    /// The first rule the draft breaks, checked in field order.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.content.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        if self.max_views < 1 {
            return Err(DraftError::MaxViews);
        }
        if self.expires_in < 1 {
            return Err(DraftError::ExpiresIn);
        }
        Ok(())
    }
}

impl From<&Draft> for NewSnippet {
    fn from(draft: &Draft) -> Self {
        Self {
            content: draft.content.clone(),
            title: draft.title.clone(),
            language: sanitize_language(&draft.language).to_owned(),
            max_views: draft.max_views,
            expires_in: draft.expires_in,
        }
    }
}

/// Shared draft. Readers always see a whole `Draft`, never a half-cleared one.
#[derive(Debug, Default)]
pub struct DraftStore {
    draft: RwLock<Draft>,
}

impl DraftStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_draft(draft: Draft) -> Self {
        Self { draft: RwLock::new(draft) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Draft {
        self.draft
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate fields in place under one write lock.
    pub fn update<R>(&self, edit: impl FnOnce(&mut Draft) -> R) -> R {
        let mut draft = self.draft.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut draft)
    }

    pub fn clear(&self) {
        *self.draft.write().unwrap_or_else(PoisonError::into_inner) = Draft::default();
    }

    /// Recomputed from the current content on every call.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.draft
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_draft()
    }

    /// Validated create request built from the current draft.
    ///
    /// # Errors
    ///
    /// See [`Draft::validate`].
    pub fn to_request(&self) -> Result<NewSnippet, DraftError> {
        let draft = self.snapshot();
        draft.validate()?;
        Ok(NewSnippet::from(&draft))
    }
}
