use serde::Deserialize;

/// Configuration for the blob store holding uploaded files.
#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// Which backend to use: `"memory"` or `"local"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Root directory for the `"local"` backend.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_path(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_path() -> String {
    "data/blobs".to_owned()
}
