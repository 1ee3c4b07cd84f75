use thiserror::Error;

/// Errors from drop store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert clashed with an existing drop id or delete token.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("drop not found: {0}")]
    NotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}
