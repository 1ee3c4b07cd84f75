use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drop::{DropKind, FileRef};

/// Content supplied when creating a drop.
///
/// File bytes are uploaded to the blob store before creation; only the
/// resulting reference reaches the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewContent {
    Text(String),
    File(FileRef),
}

impl NewContent {
    /// The kind of drop this content will produce.
    #[must_use]
    pub fn kind(&self) -> DropKind {
        match self {
            Self::Text(_) => DropKind::Text,
            Self::File(_) => DropKind::File,
        }
    }
}

/// A request to create a new drop.
#[derive(Debug, Clone)]
pub struct CreateDrop {
    /// The text or uploaded file reference.
    pub content: NewContent,
    /// Lifetime in minutes. The engine default applies when `None`.
    pub ttl_minutes: Option<u32>,
    /// Optional plaintext access password. Hashed before it is stored.
    pub password: Option<String>,
    /// Expire the drop right after its first successful retrieval.
    pub one_time_view: bool,
    /// Optional cap on successful retrievals.
    pub max_downloads: Option<u32>,
}

impl CreateDrop {
    /// A text drop with default settings.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NewContent::Text(text.into()))
    }

    /// A file drop with default settings.
    #[must_use]
    pub fn file(file: FileRef) -> Self {
        Self::new(NewContent::File(file))
    }

    fn new(content: NewContent) -> Self {
        Self {
            content,
            ttl_minutes: None,
            password: None,
            one_time_view: false,
            max_downloads: None,
        }
    }

    /// Set the lifetime in minutes.
    #[must_use]
    pub fn with_ttl_minutes(mut self, minutes: u32) -> Self {
        self.ttl_minutes = Some(minutes);
        self
    }

    /// Protect the drop with a password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Make the drop a one-time view.
    #[must_use]
    pub fn with_one_time_view(mut self, one_time_view: bool) -> Self {
        self.one_time_view = one_time_view;
        self
    }

    /// Cap the number of successful retrievals.
    #[must_use]
    pub fn with_max_downloads(mut self, max: u32) -> Self {
        self.max_downloads = Some(max);
        self
    }
}

/// The result of a successful create.
///
/// `delete_token` is surfaced exactly once, here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDrop {
    pub id: String,
    pub delete_token: String,
    pub expires_at: DateTime<Utc>,
}
