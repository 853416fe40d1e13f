//! Durable credential storage.
//!
//! One key holds the raw credential string; absence of the key means
//! "no session". Storage is read exactly once, during
//! [`SessionStore::initialize`], and written only through
//! `set_credential`/`clear_credential`, never live-reloaded afterwards.
//!
//! [`SessionStore::initialize`]: crate::store::SessionStore::initialize

use crate::error::StorageError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Abstraction over the durable store holding the credential.
///
/// Access is synchronous: the backing store is local (a file, browser
/// local storage, a keychain), never the network.
pub trait CredentialStorage: Send + Sync {
    /// Reads the persisted credential, or `None` when the key is absent.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persists the credential, overwriting any previous value.
    fn store(&self, credential: &str) -> Result<(), StorageError>;

    /// Erases the persisted credential. Erasing an absent key succeeds.
    fn erase(&self) -> Result<(), StorageError>;
}

/// File-backed credential storage.
///
/// The credential is kept verbatim in a single file named after the
/// storage key, inside the configured directory.
#[derive(Debug)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    /// Creates storage rooted at `dir`, keyed by `key`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(key),
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                details: e.to_string(),
            }),
        }
    }

    fn store(&self, credential: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write {
                details: e.to_string(),
            })?;
        }
        fs::write(&self.path, credential).map_err(|e| StorageError::Write {
            details: e.to_string(),
        })
    }

    fn erase(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Erase {
                details: e.to_string(),
            }),
        }
    }
}

/// In-memory credential storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-seeded with a persisted credential.
    #[must_use]
    pub fn with_value(credential: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(credential.into())),
        }
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.lock().unwrap().clone())
    }

    fn store(&self, credential: &str) -> Result<(), StorageError> {
        *self.value.lock().unwrap() = Some(credential.to_string());
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}
