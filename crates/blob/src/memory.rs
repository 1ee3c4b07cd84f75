use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

use linkvault_core::FileRef;

use crate::error::BlobError;
use crate::store::BlobStore;

/// In-memory [`BlobStore`]. Content is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
    max_bytes: Option<u64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject blobs larger than `max_bytes`.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
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
        self.blobs.insert(blob_id.clone(), data);
        Ok(FileRef {
            blob_id,
            original_name: original_name.to_owned(),
            mime_type: mime_type.to_owned(),
            size_bytes: size,
        })
    }

    async fn get(&self, blob_id: &str) -> Result<Option<Bytes>, BlobError> {
        Ok(self.blobs.get(blob_id).map(|entry| entry.value().clone()))
    }

    async fn release(&self, blob_id: &str) -> Result<(), BlobError> {
        self.blobs.remove(blob_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_release() {
        let store = MemoryBlobStore::new();
        let file = store
            .put("notes.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(file.original_name, "notes.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.size_bytes, 5);

        let data = store.get(&file.blob_id).await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"hello"[..]));

        store.release(&file.blob_id).await.unwrap();
        assert!(store.get(&file.blob_id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn release_unknown_is_ok() {
        let store = MemoryBlobStore::new();
        store.release("never-stored").await.unwrap();
    }

    #[tokio::test]
    async fn blob_ids_are_unique() {
        let store = MemoryBlobStore::new();
        let a = store.put("a", "text/plain", Bytes::new()).await.unwrap();
        let b = store.put("a", "text/plain", Bytes::new()).await.unwrap();
        assert_ne!(a.blob_id, b.blob_id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn oversized_blob_is_rejected() {
        let store = MemoryBlobStore::new().with_max_bytes(4);
        let err = store
            .put("big.bin", "application/octet-stream", Bytes::from_static(b"12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::TooLarge { size: 5, limit: 4 }));
        assert!(store.is_empty());
    }
}
