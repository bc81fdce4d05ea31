//! Session state and the local token store.
//!
//! ARCHITECTURE
//! ============
//! The token lives in a `TokenStore` so it survives process restarts (the
//! CLI uses `FileTokenStore`), while the validated user lives only in memory:
//! `user` is set iff a token was validated during this process lifetime.
//! `Session` is owned by the gateway and injected explicitly; nothing reads
//! the token from ambient state.
//!
//! TRADE-OFFS
//! ==========
//! `FileTokenStore` does small synchronous reads and writes on the calling
//! task. The file holds a few bytes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::GatewayError;
use crate::models::SessionUser;

/// Fixed key the token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "burger-mafia-token";

// =============================================================================
// TOKEN STORE
// =============================================================================

/// String-valued persistent storage for the auth token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the backing storage is unreadable.
    fn load(&self) -> Result<Option<String>, GatewayError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the write fails.
    fn save(&self, token: &str) -> Result<(), GatewayError>;

    /// Remove the stored token. Removing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the write fails.
    fn clear(&self) -> Result<(), GatewayError>;
}

/// Process-local store, used by tests and short-lived embeddings.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_owned())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, GatewayError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), GatewayError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), GatewayError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON key/value file holding the token under [`TOKEN_STORAGE_KEY`].
/// Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, GatewayError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(GatewayError::Store(format!("read {}: {e}", self.path.display()))),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| GatewayError::Store(format!("parse {}: {e}", self.path.display())))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), GatewayError> {
        let rendered = serde_json::to_string_pretty(map).map_err(|e| GatewayError::Store(e.to_string()))?;
        std::fs::write(&self.path, rendered)
            .map_err(|e| GatewayError::Store(format!("write {}: {e}", self.path.display())))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, GatewayError> {
        Ok(self.read_map()?.remove(TOKEN_STORAGE_KEY))
    }

    fn save(&self, token: &str) -> Result<(), GatewayError> {
        let mut map = self.read_map()?;
        map.insert(TOKEN_STORAGE_KEY.to_owned(), token.to_owned());
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), GatewayError> {
        let mut map = self.read_map()?;
        if map.remove(TOKEN_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Current token (via the store) plus the validated user.
pub struct Session {
    store: Box<dyn TokenStore>,
    user: RwLock<Option<SessionUser>>,
    loading: AtomicBool,
}

impl Session {
    /// A fresh session starts in the loading state until
    /// [`Session::finish_loading`] is called by session verification.
    #[must_use]
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self { store: Box::new(store), user: RwLock::new(None), loading: AtomicBool::new(true) }
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the token store is unreadable.
    pub fn token(&self) -> Result<Option<String>, GatewayError> {
        self.store.load()
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] when the token cannot be persisted.
    pub fn set_token(&self, token: &str) -> Result<(), GatewayError> {
        self.store.save(token)
    }

    /// Remove the token only, leaving any in-memory user untouched.
    pub fn clear_token(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
    }

    /// Tear the session down: token and user both absent afterwards.
    pub fn clear(&self) {
        self.clear_token();
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_user(&self, user: SessionUser) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// `true` until the startup verification has finished.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn finish_loading(&self) {
        self.loading.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
