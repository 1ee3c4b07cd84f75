use async_trait::async_trait;
use bytes::Bytes;

use linkvault_core::FileRef;

use crate::error::BlobError;

/// Storage for the bytes behind file drops.
///
/// Drop records only hold a [`FileRef`]; the content lives here under an
/// opaque blob id assigned by the store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` and return a reference to it.
    ///
    /// The store assigns a fresh, unique blob id.
    async fn put(
        &self,
        original_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<FileRef, BlobError>;

    /// Read a blob's content. Returns `None` if the blob does not exist.
    async fn get(&self, blob_id: &str) -> Result<Option<Bytes>, BlobError>;

    /// Release a blob's storage.
    ///
    /// Releasing a blob that does not exist is not an error.
    async fn release(&self, blob_id: &str) -> Result<(), BlobError>;
}
