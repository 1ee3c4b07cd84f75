use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use linkvault_engine::MetricsSnapshot;

/// Response body for `POST /api/upload`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Public id of the new drop.
    pub id: String,
    /// Shareable link to the drop.
    pub link: String,
    /// Secret token for deleting the drop. Returned only here.
    pub delete_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Query parameters for retrieving a drop.
#[derive(Debug, Default, Deserialize)]
pub struct RetrieveQuery {
    pub password: Option<String>,
}

/// Request body for `POST /api/delete`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub short_id: String,
    pub delete_token: String,
}

/// Response body for `POST /api/delete`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub metrics: MetricsSnapshot,
}
