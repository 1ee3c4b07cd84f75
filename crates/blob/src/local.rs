//! Local filesystem blob backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use linkvault_core::FileRef;

use crate::error::BlobError;
use crate::store::BlobStore;

/// Filesystem-backed [`BlobStore`].
///
/// Each blob is one file named by its UUID.
/// Structure: `{root}/blobs/{blob_id}`
pub struct LocalBlobStore {
    root: PathBuf,
    max_bytes: Option<u64>,
}

impl LocalBlobStore {
    /// Create storage at the given root directory.
    ///
    /// Creates the directory structure if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, BlobError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("blobs")).await?;
        Ok(Self {
            root,
            max_bytes: None,
        })
    }

    /// Reject blobs larger than `max_bytes`.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Path of a blob, or `None` if `blob_id` is not one this store could
    /// have issued.
    fn blob_path(&self, blob_id: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(blob_id).ok()?;
        Some(self.root.join("blobs").join(id.to_string()))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        original_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<FileRef, BlobError> {
        let size = data.len() as u64;
        if let Some(limit) = self.max_bytes
            && size > limit
        {
            return Err(BlobError::TooLarge { size, limit });
        }

        let blob_id = Uuid::new_v4().to_string();
        let path = self.root.join("blobs").join(&blob_id);
        fs::write(&path, &data).await?;
        debug!(%blob_id, size, "stored blob");

        Ok(FileRef {
            blob_id,
            original_name: original_name.to_owned(),
            mime_type: mime_type.to_owned(),
            size_bytes: size,
        })
    }

    async fn get(&self, blob_id: &str) -> Result<Option<Bytes>, BlobError> {
        let Some(path) = self.blob_path(blob_id) else {
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn release(&self, blob_id: &str) -> Result<(), BlobError> {
        let Some(path) = self.blob_path(blob_id) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
