use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use linkvault_blob::BlobError;
use linkvault_engine::EngineError;

/// Errors that can occur when running the LinkVault server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A lifecycle error surfaced through the API.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The request could not be interpreted.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The multipart body could not be read.
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

const PASSWORD_REQUIRED: &str = "password required";
const INTERNAL: &str = "internal server error";

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            Self::Multipart(e) => (e.status(), serde_json::json!({ "error": e.body_text() })),
            Self::Engine(e) => engine_error_response(e),
            e @ (Self::Config(_) | Self::Io(_)) => {
                error!(error = %e, "server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": INTERNAL }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Map an engine error to a status code and JSON body.
///
/// Both password errors share one body so callers cannot tell a missing
/// password from a wrong one. Storage details never leave the server.
fn engine_error_response(e: EngineError) -> (StatusCode, serde_json::Value) {
    let plain = |status: StatusCode, msg: &str| (status, serde_json::json!({ "error": msg }));

    match e {
        EngineError::Validation(msg) => plain(StatusCode::BAD_REQUEST, &msg),
        EngineError::NotFound => plain(StatusCode::NOT_FOUND, "drop not found"),
        EngineError::Expired => plain(StatusCode::FORBIDDEN, "drop has expired"),
        EngineError::Exhausted => plain(StatusCode::GONE, "download limit reached"),
        EngineError::PasswordRequired | EngineError::PasswordIncorrect => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": PASSWORD_REQUIRED, "protected": true }),
        ),
        EngineError::Unauthorized => plain(StatusCode::FORBIDDEN, "invalid delete token"),
        EngineError::Blob(BlobError::TooLarge { limit, .. }) => plain(
            StatusCode::PAYLOAD_TOO_LARGE,
            &format!("file exceeds the {limit} byte limit"),
        ),
        e @ (EngineError::Storage(_)
        | EngineError::Blob(_)
        | EngineError::Configuration(_)
        | EngineError::Internal(_)) => {
            error!(error = %e, "request failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}
