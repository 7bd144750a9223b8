use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::traits::{BlobStore, validate_path};

/// In-process blob store. Used for local development and tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_path(path)?;
        self.blobs
            .write()
            .await
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.read().await.contains_key(path))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.write().await.remove(path).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_deletes() {
        let store = MemoryBlobStore::new();
        store.put("images/a.jpg", b"abc").await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("images/a.jpg").await.unwrap(), b"abc");
        assert!(store.delete("images/a.jpg").await.unwrap());
        assert!(store.is_empty().await);
        assert!(matches!(
            store.get("images/a.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
