use async_trait::async_trait;

use super::error::StorageError;

/// Path-addressed blob storage.
///
/// Paths are relative, `/`-separated keys such as `images/<hash>.png`.
/// Callers decide the naming scheme; the store only persists bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path`, replacing whatever was there.
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve all bytes stored at `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete the blob at `path`.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Reject absolute paths, empty segments and parent traversal.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if bad {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
