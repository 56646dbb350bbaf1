//! Identity session: which email gets attached to each gateway call.
//!
//! DESIGN
//! ======
//! The identity is either fixed at construction or read from an injected
//! [`IdentityStore`] on every call, so edits made to the store outside this
//! flow are picked up. When the store is empty the session asks an async
//! [`IdentityPrompt`], one call at a time; a non-empty answer is persisted and
//! answers the calls queued behind it, an empty one yields the anonymous
//! sentinel for that call only. Without a prompt the
//! session reports [`ApiError::IdentityRequired`] and the caller decides how
//! to collect an email.

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ApiError;

/// Store key under which the identity is persisted.
pub const IDENTITY_KEY: &str = "userEmail";

/// Identity used when the user declines to give one.
pub const ANONYMOUS_IDENTITY: &str = "anonymous@unknown.com";

/// Text shown when asking the user for an email.
pub const IDENTITY_PROMPT: &str = "Please enter your email address to continue:";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity store I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("identity store at {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Client-local key/value storage that outlives a single session.
pub trait IdentityStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError>;
}

/// Asks the user for an email without blocking the async runtime.
#[async_trait::async_trait]
pub trait IdentityPrompt: Send + Sync {
    /// Returns `None` when the user cancels or gives nothing.
    async fn ask(&self, message: &str) -> Option<String>;
}

// =============================================================================
// STORES
// =============================================================================

/// Volatile store, useful for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// JSON object on disk, one string value per key.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, IdentityError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => return Err(IdentityError::Io { path: self.path.clone(), source }),
        };
        serde_json::from_str(&raw).map_err(|source| IdentityError::Corrupt { path: self.path.clone(), source })
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(error = %e, "identity store unreadable; treating as empty");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(e @ IdentityError::Corrupt { .. }) => {
                tracing::warn!(error = %e, "identity store corrupt; rewriting it");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_owned(), value.to_owned());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| IdentityError::Io { path: parent.to_path_buf(), source })?;
        }
        let body = serde_json::to_string_pretty(&entries)
            .map_err(|source| IdentityError::Corrupt { path: self.path.clone(), source })?;
        std::fs::write(&self.path, body).map_err(|source| IdentityError::Io { path: self.path.clone(), source })
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Resolves the identity attached to each call.
#[derive(Clone)]
pub struct Session {
    fixed: Option<String>,
    store: Arc<dyn IdentityStore>,
    prompt: Option<Arc<dyn IdentityPrompt>>,
    /// One prompt at a time, shared by every clone.
    asking: Arc<tokio::sync::Mutex<()>>,
}

impl Session {
    /// Session backed by `store`, with no way to ask the user.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { fixed: None, store, prompt: None, asking: Arc::default() }
    }

    /// Session that always uses `email`, ignoring the store.
    #[must_use]
    pub fn with_identity(email: impl Into<String>) -> Self {
        Self {
            fixed: Some(email.into()),
            store: Arc::new(MemoryIdentityStore::new()),
            prompt: None,
            asking: Arc::default(),
        }
    }

    /// Ask `prompt` whenever the store has no identity.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn IdentityPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Identity currently known without asking anyone.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        if let Some(fixed) = &self.fixed {
            return Some(fixed.clone());
        }
        self.store.get(IDENTITY_KEY).filter(|v| !v.is_empty())
    }

    /// Resolve the identity for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::IdentityRequired`] if nothing is stored and no prompt is configured.
    pub async fn resolve(&self) -> Result<String, ApiError> {
        if let Some(known) = self.current() {
            return Ok(known);
        }
        let Some(prompt) = &self.prompt else {
            return Err(ApiError::IdentityRequired);
        };

        let _asking = self.asking.lock().await;
        // Another call may have stored an answer while this one waited.
        if let Some(known) = self.current() {
            return Ok(known);
        }
        let answer = prompt.ask(IDENTITY_PROMPT).await;
        Ok(self.supply(answer.as_deref()))
    }

    /// Accept an answer collected by the caller. Non-empty answers are persisted.
    pub fn supply(&self, answer: Option<&str>) -> String {
        let Some(email) = answer.map(str::trim).filter(|a| !a.is_empty()) else {
            return ANONYMOUS_IDENTITY.to_owned();
        };
        if let Err(e) = self.store.set(IDENTITY_KEY, email) {
            tracing::warn!(error = %e, "failed to persist identity; using it for this call only");
        }
        email.to_owned()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("fixed", &self.fixed)
            .field("has_prompt", &self.prompt.is_some())
            .finish_non_exhaustive()
    }
}
