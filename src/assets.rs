use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AssetResolutionError;
use crate::storage::{BlobStore, ContentHash, StorageError};

/// Directory under which every uploaded image is stored.
pub const IMAGES_NAMESPACE: &str = "images";

/// Content-addressed path of a stored image, e.g. `images/<sha256>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file attached in an edit form, not yet stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpload {
    /// Original file name; only its extension is kept.
    pub file_name: String,
    /// File contents, base64 on the wire.
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub data: Vec<u8>,
}

impl AssetUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.data.len())
            .finish()
    }
}

fn to_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}

/// Result of [`AssetStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub asset_ref: AssetRef,
    /// `true` when this call wrote the blob, `false` when identical bytes
    /// were already stored under the same path.
    pub created: bool,
}

/// Content-addressed image store on top of a [`BlobStore`].
///
/// Identical bytes with the same extension always map to the same path, so
/// re-saving an unchanged form never duplicates storage.
#[derive(Clone)]
pub struct AssetStore {
    blobs: Arc<dyn BlobStore>,
    public_base_url: String,
}

impl AssetStore {
    pub fn new(blobs: Arc<dyn BlobStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            blobs,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Compute the path an upload would be stored under.
    pub fn path_for(upload: &AssetUpload) -> AssetRef {
        let hash = ContentHash::compute(&upload.data);
        match file_extension(&upload.file_name) {
            Some(ext) => AssetRef(format!("{IMAGES_NAMESPACE}/{hash}.{ext}")),
            None => AssetRef(format!("{IMAGES_NAMESPACE}/{hash}")),
        }
    }

    /// Store an upload under its content-addressed path.
    ///
    /// The write is skipped when the path already exists.
    pub async fn store(&self, upload: &AssetUpload) -> Result<StoredAsset, StorageError> {
        let asset_ref = Self::path_for(upload);

        if self.blobs.exists(asset_ref.as_str()).await? {
            tracing::debug!(asset = %asset_ref, "asset already stored, skipping upload");
            return Ok(StoredAsset {
                asset_ref,
                created: false,
            });
        }

        self.blobs.put(asset_ref.as_str(), &upload.data).await?;
        tracing::debug!(asset = %asset_ref, bytes = upload.data.len(), "stored asset");
        Ok(StoredAsset {
            asset_ref,
            created: true,
        })
    }

    /// Turn an asset reference into a URL that serves its bytes.
    ///
    /// Fails if the blob is missing rather than handing out a broken URL.
    pub async fn resolve(&self, asset_ref: &AssetRef) -> Result<String, AssetResolutionError> {
        match self.blobs.exists(asset_ref.as_str()).await {
            Ok(true) => Ok(format!("{}/{}", self.public_base_url, asset_ref)),
            Ok(false) => Err(AssetResolutionError::Missing(asset_ref.to_string())),
            Err(source) => Err(AssetResolutionError::Storage {
                asset_ref: asset_ref.to_string(),
                source,
            }),
        }
    }

    /// Whether a referenced blob is present.
    pub async fn contains(&self, asset_ref: &AssetRef) -> Result<bool, StorageError> {
        self.blobs.exists(asset_ref.as_str()).await
    }

    /// Raw bytes of a stored asset.
    pub async fn fetch(&self, asset_ref: &AssetRef) -> Result<Vec<u8>, StorageError> {
        self.blobs.get(asset_ref.as_str()).await
    }

    /// Delete blobs written by a save that did not complete.
    ///
    /// Failures are logged; the blobs are then orphaned.
    pub async fn discard(&self, refs: &[AssetRef]) {
        for asset_ref in refs {
            match self.blobs.delete(asset_ref.as_str()).await {
                Ok(_) => tracing::info!(asset = %asset_ref, "discarded unused asset"),
                Err(e) => tracing::warn!(asset = %asset_ref, "failed to discard asset: {e}"),
            }
        }
    }
}

/// Lowercased alphanumeric extension of a file name, if any.
fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBlobStore;

    fn store() -> (AssetStore, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let assets = AssetStore::new(blobs.clone(), "http://localhost:8080/api/assets/");
        (assets, blobs)
    }

    #[tokio::test]
    async fn identical_bytes_share_one_path() {
        let (assets, blobs) = store();
        let first = assets
            .store(&AssetUpload::new("me.png", b"same".to_vec()))
            .await
            .unwrap();
        let second = assets
            .store(&AssetUpload::new("copy-of-me.png", b"same".to_vec()))
            .await
            .unwrap();

        assert_eq!(first.asset_ref, second.asset_ref);
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(blobs.len().await, 1);
    }

    #[tokio::test]
    async fn path_is_namespace_hash_and_extension() {
        let upload = AssetUpload::new("Photo.JPG", b"abc".to_vec());
        assert_eq!(
            AssetStore::path_for(&upload).as_str(),
            "images/ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg"
        );
    }

    #[tokio::test]
    async fn missing_extension_keeps_bare_hash() {
        let upload = AssetUpload::new("photo", b"abc".to_vec());
        assert_eq!(
            AssetStore::path_for(&upload).as_str(),
            "images/ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn resolve_builds_public_url() {
        let (assets, _) = store();
        let stored = assets
            .store(&AssetUpload::new("a.png", b"a".to_vec()))
            .await
            .unwrap();
        let url = assets.resolve(&stored.asset_ref).await.unwrap();
        assert_eq!(
            url,
            format!("http://localhost:8080/api/assets/{}", stored.asset_ref)
        );
    }

    #[tokio::test]
    async fn resolve_missing_asset_fails() {
        let (assets, _) = store();
        let err = assets
            .resolve(&AssetRef::new("images/nope.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetResolutionError::Missing(path) if path == "images/nope.png"));
    }

    #[tokio::test]
    async fn discard_removes_blobs() {
        let (assets, blobs) = store();
        let stored = assets
            .store(&AssetUpload::new("a.png", b"a".to_vec()))
            .await
            .unwrap();
        assets.discard(&[stored.asset_ref]).await;
        assert!(blobs.is_empty().await);
    }

    #[test]
    fn upload_deserializes_base64() {
        let upload: AssetUpload =
            serde_json::from_str(r#"{"file_name":"a.png","data":"aGVsbG8="}"#).unwrap();
        assert_eq!(upload.data, b"hello");
    }
}
