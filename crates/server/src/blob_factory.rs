use std::sync::Arc;

use linkvault_blob::{BlobStore, LocalBlobStore, MemoryBlobStore};

use crate::config::BlobConfig;
use crate::error::ServerError;

/// Construct a [`BlobStore`] from configuration, rejecting blobs larger
/// than `max_bytes`.
pub async fn create_blob_store(
    config: &BlobConfig,
    max_bytes: u64,
) -> Result<Arc<dyn BlobStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryBlobStore::new().with_max_bytes(max_bytes))),
        "local" => {
            let store = LocalBlobStore::new(&config.path)
                .await
                .map_err(|e| ServerError::Config(format!("local blob store at {}: {e}", config.path)))?;
            Ok(Arc::new(store.with_max_bytes(max_bytes)))
        }
        other => Err(ServerError::Config(format!(
            "unsupported blob backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_backend_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("blobs");
        let config = BlobConfig {
            backend: "local".into(),
            path: root.to_string_lossy().into_owned(),
        };

        let store = create_blob_store(&config, 1024).await.unwrap();
        let file = store
            .put("a.txt", "text/plain", bytes::Bytes::from_static(b"hi"))
            .await
            .unwrap();
        assert!(root.join("blobs").join(&file.blob_id).exists());
    }

    #[tokio::test]
    async fn unknown_backend_is_a_config_error() {
        let config = BlobConfig {
            backend: "s3".into(),
            ..BlobConfig::default()
        };
        let err = create_blob_store(&config, 1024).await.err().unwrap();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
