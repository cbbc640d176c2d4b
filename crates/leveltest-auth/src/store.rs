//! Durable token persistence.
//!
//! One opaque bearer token lives in one well-known location; the store
//! trait keeps the auth lifecycle testable without touching the
//! filesystem.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AuthFlowError;

/// Persists the session token across process restarts.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, AuthFlowError>;

    /// Persist a token, replacing any previous one.
    fn save(&self, token: &str) -> Result<(), AuthFlowError>;

    /// Remove the persisted token. Removing an absent token is not an
    /// error.
    fn clear(&self) -> Result<(), AuthFlowError>;
}

/// File-backed store at a well-known path.
///
/// Default location: `$LEVELTEST_HOME/token`, falling back to
/// `~/.config/leveltest/token`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store at the default well-known path.
    pub fn default_store() -> Result<Self, AuthFlowError> {
        let dir = config_dir().ok_or_else(|| {
            AuthFlowError::Storage(std::io::Error::other(
                "cannot determine a home directory for the token store",
            ))
        })?;
        Ok(Self::new(dir.join("token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn config_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("LEVELTEST_HOME") {
        return Some(PathBuf::from(home));
    }
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("leveltest"))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AuthFlowError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), AuthFlowError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthFlowError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, AuthFlowError> {
        Ok(self.token.lock().expect("token lock poisoned").clone())
    }

    fn save(&self, token: &str) -> Result<(), AuthFlowError> {
        *self.token.lock().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthFlowError> {
        *self.token.lock().expect("token lock poisoned") = None;
        Ok(())
    }
}
