use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The blob exceeds the maximum allowed size.
    #[error("blob too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// A filesystem error occurred.
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}
