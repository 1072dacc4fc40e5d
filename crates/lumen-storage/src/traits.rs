//! Storage abstraction trait
//!
//! The upload handler hands every accepted image to a `Storage` implementation. The
//! gateway itself never touches the filesystem.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of a stored object
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal identifier used to reference the file
    pub key: String,
    /// Publicly accessible URL of the file
    pub url: String,
    pub size: usize,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Store an image under a freshly generated key.
    async fn store(&self, content_type: &str, data: Bytes) -> StorageResult<StoredObject>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check whether a key exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
