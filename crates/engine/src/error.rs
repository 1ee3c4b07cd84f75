use thiserror::Error;

use linkvault_blob::BlobError;
use linkvault_store::StoreError;

/// Errors returned by [`DropEngine`](crate::DropEngine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The create request was malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// No drop exists with the given id.
    #[error("drop not found")]
    NotFound,

    /// The drop's access window has closed.
    #[error("drop expired")]
    Expired,

    /// The drop reached its download limit.
    #[error("download limit reached")]
    Exhausted,

    /// The drop is protected and no password was supplied.
    #[error("password required")]
    PasswordRequired,

    /// The supplied password does not match.
    #[error("password incorrect")]
    PasswordIncorrect,

    /// The delete token does not match.
    #[error("invalid delete token")]
    Unauthorized,

    /// The drop store failed.
    #[error("store error: {0}")]
    Storage(#[from] StoreError),

    /// The blob store failed.
    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    /// The engine was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}
