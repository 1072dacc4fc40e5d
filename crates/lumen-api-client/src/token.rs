//! Bearer token providers.
//!
//! The client never reads ambient state for its token. It asks the `TokenProvider`
//! it was built with, so callers decide where the token lives.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source of the bearer token. `None` (or an empty string) means unauthenticated.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Token file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// In-process token slot shared between the code that logs in and the client.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
    }

    pub fn clear(&self) {
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl TokenProvider for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Token persisted as `{"token": "..."}` in a JSON file. Read on every request, so a
/// login from another process is picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/lumen/token.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lumen").join("token.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: TokenFile = serde_json::from_slice(&contents)?;
        Ok(Some(file.token))
    }

    pub fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_vec_pretty(&TokenFile {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "Token stored");
        Ok(())
    }

    /// Remove the stored token. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable token file");
                None
            }
        }
    }
}
