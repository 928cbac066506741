//! Persisted local state: credentials and display preferences.
//!
//! The hub client keeps exactly three durable values: the access token,
//! the refresh token, and the dark-mode flag. They live in a small JSON
//! key-value file so a restarted client can resume its session.
//!
//! Storage is injected behind the [`LocalStorage`] trait so tests and
//! ephemeral sessions can run fully in memory. Both the session store and
//! the transport read tokens *at call time* - never cached in a request
//! path - so a just-refreshed token is always picked up on retry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use tracing::warn;

/// Keys used in persisted storage.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const DARK_MODE: &str = "dark_mode";
}

/// A small synchronous string key-value store.
///
/// Writes are expected to be durable but infallible at the call site;
/// implementations log and swallow I/O failures.
pub trait LocalStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn set(&self, key: &str, value: &str);
    /// Delete a value.
    fn remove(&self, key: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// Implementations
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

/// Durable storage backed by a JSON file.
///
/// The whole map is rewritten on every mutation; the file holds three
/// short strings, so this is not a throughput concern.
pub struct DiskStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl DiskStorage {
    /// Open (or initialize) storage at `path`.
    ///
    /// A missing or unreadable file starts empty; corruption is logged
    /// rather than propagated so a damaged file degrades to a logged-out
    /// state instead of a startup failure.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt local storage file, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read local storage file");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %self.path.display(), error = %e, "failed to create storage directory");
            return;
        }

        match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&self.path, bytes) {
                    warn!(path = %self.path.display(), error = %e, "failed to write local storage file");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize local storage"),
        }
    }
}

impl LocalStorage for DiskStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed facade
// ─────────────────────────────────────────────────────────────────────────────

/// Cheaply cloneable typed view over a [`LocalStorage`].
#[derive(Clone)]
pub struct StorageHandle {
    inner: Arc<dyn LocalStorage>,
}

impl StorageHandle {
    /// Wrap a storage implementation.
    #[must_use]
    pub fn new(inner: Arc<dyn LocalStorage>) -> Self {
        Self { inner }
    }

    /// Current access token, read fresh from storage.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.inner.get(keys::ACCESS_TOKEN).map(SecretString::from)
    }

    /// Current refresh token, read fresh from storage.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.inner.get(keys::REFRESH_TOKEN).map(SecretString::from)
    }

    /// Whether both credentials are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.inner.get(keys::ACCESS_TOKEN).is_some() && self.inner.get(keys::REFRESH_TOKEN).is_some()
    }

    /// Replace both tokens.
    pub fn set_tokens(&self, access: &str, refresh: &str) {
        self.inner.set(keys::ACCESS_TOKEN, access);
        self.inner.set(keys::REFRESH_TOKEN, refresh);
    }

    /// Replace the access token alone, leaving the refresh key untouched.
    pub fn set_access_token(&self, access: &str) {
        self.inner.set(keys::ACCESS_TOKEN, access);
    }

    /// Erase both tokens.
    pub fn clear_tokens(&self) {
        self.inner.remove(keys::ACCESS_TOKEN);
        self.inner.remove(keys::REFRESH_TOKEN);
    }

    /// Persisted dark-mode flag; absent means light mode.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.inner
            .get(keys::DARK_MODE)
            .is_some_and(|v| v == "true")
    }

    /// Persist the dark-mode flag.
    pub fn set_dark_mode(&self, enabled: bool) {
        self.inner
            .set(keys::DARK_MODE, if enabled { "true" } else { "false" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set("k", "v");
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_handle_token_lifecycle() {
        let handle = StorageHandle::new(Arc::new(MemoryStorage::new()));
        assert!(!handle.has_credentials());

        handle.set_tokens("acc", "ref");
        assert!(handle.has_credentials());
        assert_eq!(
            handle.access_token().map(|t| t.expose_secret().to_string()),
            Some("acc".to_string())
        );

        handle.clear_tokens();
        assert!(!handle.has_credentials());
        assert!(handle.access_token().is_none());
        assert!(handle.refresh_token().is_none());
    }

    #[test]
    fn test_set_access_token_leaves_refresh_alone() {
        let handle = StorageHandle::new(Arc::new(MemoryStorage::new()));
        handle.set_access_token("acc");
        assert!(handle.access_token().is_some());
        assert!(handle.refresh_token().is_none());
        assert!(!handle.has_credentials());

        handle.set_tokens("acc", "ref");
        handle.set_access_token("acc2");
        assert_eq!(
            handle.refresh_token().map(|t| t.expose_secret().to_string()),
            Some("ref".to_string())
        );
    }

    #[test]
    fn test_dark_mode_flag() {
        let handle = StorageHandle::new(Arc::new(MemoryStorage::new()));
        assert!(!handle.dark_mode());
        handle.set_dark_mode(true);
        assert!(handle.dark_mode());
        handle.set_dark_mode(false);
        assert!(!handle.dark_mode());
    }

    #[test]
    fn test_disk_storage_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");

        {
            let storage = DiskStorage::open(&path);
            storage.set(keys::ACCESS_TOKEN, "acc");
            storage.set(keys::DARK_MODE, "true");
        }

        let reopened = DiskStorage::open(&path);
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).as_deref(), Some("acc"));
        assert_eq!(reopened.get(keys::DARK_MODE).as_deref(), Some("true"));
    }

    #[test]
    fn test_disk_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").expect("write");

        let storage = DiskStorage::open(&path);
        assert_eq!(storage.get(keys::ACCESS_TOKEN), None);
    }
}
