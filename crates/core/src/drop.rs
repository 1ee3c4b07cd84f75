use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminates the two kinds of content a drop can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropKind {
    Text,
    File,
}

impl DropKind {
    /// Return a string representation of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for DropKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an uploaded object held by a blob store.
///
/// The drop only owns the reference; the bytes belong to the blob store and
/// are released when the drop is deleted or swept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Opaque object identifier assigned by the blob store.
    pub blob_id: String,
    /// Filename as supplied by the uploader.
    pub original_name: String,
    /// MIME type as supplied by the uploader (e.g. `"application/pdf"`).
    pub mime_type: String,
    /// Size of the stored object in bytes.
    #[serde(default)]
    pub size_bytes: u64,
}

/// The payload of a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropContent {
    /// Inline text content.
    Text { text: String },
    /// A reference to an uploaded file.
    File(FileRef),
}

impl DropContent {
    /// The kind of this content.
    #[must_use]
    pub fn kind(&self) -> DropKind {
        match self {
            Self::Text { .. } => DropKind::Text,
            Self::File(_) => DropKind::File,
        }
    }

    /// The blob reference, if this is file content.
    #[must_use]
    pub fn file_ref(&self) -> Option<&FileRef> {
        match self {
            Self::File(file) => Some(file),
            Self::Text { .. } => None,
        }
    }
}

/// A shared item together with its access-control and lifecycle state.
///
/// Everything except `view_count` and `expires_at` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drop {
    /// Public short identifier used in the share link.
    pub id: String,
    /// Secret credential authorizing manual deletion.
    pub delete_token: String,
    /// Text or file reference.
    pub content: DropContent,
    /// Argon2 PHC hash of the access password, if the drop is protected.
    pub password_hash: Option<String>,
    /// Collapse expiry to "now" after the first successful retrieval.
    pub one_time_view: bool,
    /// Maximum number of successful retrievals (`None` means unlimited).
    pub max_downloads: Option<u32>,
    /// Number of successful retrievals so far.
    pub view_count: u32,
    /// When the drop was created.
    pub created_at: DateTime<Utc>,
    /// When the drop stops being retrievable.
    pub expires_at: DateTime<Utc>,
}

impl Drop {
    /// The kind of content this drop carries.
    #[must_use]
    pub fn kind(&self) -> DropKind {
        self.content.kind()
    }

    /// Returns `true` once `now` has reached `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if a download limit is set and has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.view_count >= max)
    }

    /// A drop is live while it is neither expired nor exhausted.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    /// Returns `true` if retrieval requires a password.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Build the caller-facing snapshot of this drop.
    ///
    /// The delete token and password hash are never part of a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DropSnapshot {
        DropSnapshot {
            id: self.id.clone(),
            kind: self.kind(),
            content: self.content.clone(),
            is_protected: self.is_protected(),
            one_time_view: self.one_time_view,
            max_downloads: self.max_downloads,
            view_count: self.view_count,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// A drop as returned to a recipient by a successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropSnapshot {
    pub id: String,
    pub kind: DropKind,
    pub content: DropContent,
    pub is_protected: bool,
    pub one_time_view: bool,
    pub max_downloads: Option<u32>,
    pub view_count: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
