use std::sync::Arc;

use bytes::Bytes;
use chrono::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use linkvault_blob::BlobStore;
use linkvault_core::{
    Clock, CreateDrop, CreatedDrop, CredentialHasher, Drop, DropContent, DropSnapshot, NewContent,
    TokenGenerator,
};
use linkvault_store::{DropStore, StoreError, ViewOutcome};

use crate::error::EngineError;
use crate::metrics::EngineMetrics;

/// Largest download limit a drop records; larger requests are lowered to it
/// so every backend can store the count as a signed 32-bit integer.
pub const MAX_DOWNLOADS_CAP: u32 = 0x7FFF_FFFF;

/// Tunables for drop creation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL applied when a create request carries none (default: 10 minutes).
    pub default_ttl_minutes: u32,
    /// Largest TTL a create request may ask for (default: 7 days).
    pub max_ttl_minutes: u32,
    /// How many times to regenerate tokens after an insert collision
    /// before giving up (default: 5).
    pub max_insert_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: 10,
            max_ttl_minutes: 7 * 24 * 60,
            max_insert_attempts: 5,
        }
    }
}

/// The drop lifecycle engine.
///
/// Owns explicit handles to every collaborator; cloning is cheap and all
/// clones share the same stores and metrics.
#[derive(Clone)]
pub struct DropEngine {
    pub(crate) store: Arc<dyn DropStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) hasher: Arc<dyn CredentialHasher>,
    pub(crate) tokens: Arc<dyn TokenGenerator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: Arc<EngineMetrics>,
    pub(crate) config: EngineConfig,
}

impl DropEngine {
    /// Create a new drop.
    ///
    /// The returned delete token is the only time it is ever surfaced.
    pub async fn create(&self, request: CreateDrop) -> Result<CreatedDrop, EngineError> {
        let content = match request.content {
            NewContent::Text(text) => {
                if text.trim().is_empty() {
                    return Err(EngineError::Validation(
                        "text content must not be empty".into(),
                    ));
                }
                DropContent::Text { text }
            }
            NewContent::File(file) => {
                if file.blob_id.is_empty() {
                    return Err(EngineError::Validation("file reference is missing".into()));
                }
                DropContent::File(file)
            }
        };

        let ttl_minutes = request
            .ttl_minutes
            .unwrap_or(self.config.default_ttl_minutes);
        if ttl_minutes == 0 {
            return Err(EngineError::Validation(
                "expiry must be at least one minute".into(),
            ));
        }
        if ttl_minutes > self.config.max_ttl_minutes {
            return Err(EngineError::Validation(format!(
                "expiry must not exceed {} minutes",
                self.config.max_ttl_minutes
            )));
        }
        if request.max_downloads == Some(0) {
            return Err(EngineError::Validation(
                "max downloads must be positive".into(),
            ));
        }
        let max_downloads = request.max_downloads.map(|max| max.min(MAX_DOWNLOADS_CAP));

        let password_hash = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(
                self.hasher
                    .hash(password)
                    .map_err(|e| EngineError::Internal(e.to_string()))?,
            ),
            None => None,
        };

        let created_at = self.clock.now();
        let expires_at = created_at + Duration::minutes(i64::from(ttl_minutes));

        for attempt in 1..=self.config.max_insert_attempts {
            let drop = Drop {
                id: self.tokens.new_id(),
                delete_token: self.tokens.new_delete_token(),
                content: content.clone(),
                password_hash: password_hash.clone(),
                one_time_view: request.one_time_view,
                max_downloads,
                view_count: 0,
                created_at,
                expires_at,
            };

            match self.store.insert(&drop).await {
                Ok(()) => {
                    self.metrics.increment_created();
                    info!(
                        drop_id = %drop.id,
                        kind = %drop.kind(),
                        protected = drop.is_protected(),
                        one_time_view = drop.one_time_view,
                        max_downloads = ?drop.max_downloads,
                        %expires_at,
                        "drop created"
                    );
                    return Ok(CreatedDrop {
                        id: drop.id,
                        delete_token: drop.delete_token,
                        expires_at,
                    });
                }
                Err(StoreError::UniqueViolation(what)) => {
                    warn!(attempt, conflict = %what, "token collision on insert, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::Internal(format!(
            "no unique id after {} attempts",
            self.config.max_insert_attempts
        )))
    }

    /// Retrieve a drop, counting one view.
    ///
    /// Gates run in order: existence, expiry, download limit, password. The
    /// view is then recorded as a single conditional store write. The
    /// returned snapshot carries the new view count and the expiry as it
    /// was before any one-time collapse.
    pub async fn retrieve(
        &self,
        id: &str,
        password: Option<&str>,
    ) -> Result<DropSnapshot, EngineError> {
        let now = self.clock.now();
        let Some(drop) = self.store.find_by_id(id).await? else {
            return Err(EngineError::NotFound);
        };

        if drop.is_expired(now) {
            self.metrics.increment_rejected_expired();
            return Err(EngineError::Expired);
        }
        if drop.is_exhausted() {
            self.metrics.increment_rejected_exhausted();
            return Err(EngineError::Exhausted);
        }
        if let Some(ref hash) = drop.password_hash {
            match password.filter(|p| !p.is_empty()) {
                None => {
                    self.metrics.increment_rejected_password();
                    return Err(EngineError::PasswordRequired);
                }
                Some(candidate) if !self.hasher.verify(candidate, hash) => {
                    self.metrics.increment_rejected_password();
                    debug!(drop_id = %id, "password mismatch");
                    return Err(EngineError::PasswordIncorrect);
                }
                Some(_) => {}
            }
        }

        match self.store.record_view(id, now).await? {
            ViewOutcome::Recorded { view_count } => {
                self.metrics.increment_retrieved();
                debug!(drop_id = %id, view_count, "drop retrieved");
                let mut snapshot = drop.snapshot();
                snapshot.view_count = view_count;
                Ok(snapshot)
            }
            ViewOutcome::Missing => Err(EngineError::NotFound),
            ViewOutcome::Expired => {
                self.metrics.increment_rejected_expired();
                Err(EngineError::Expired)
            }
            ViewOutcome::Exhausted => {
                self.metrics.increment_rejected_exhausted();
                Err(EngineError::Exhausted)
            }
        }
    }

    /// Retrieve a file drop and read its content.
    ///
    /// Counts as one view exactly like [`retrieve`](Self::retrieve).
    pub async fn download(
        &self,
        id: &str,
        password: Option<&str>,
    ) -> Result<(DropSnapshot, Bytes), EngineError> {
        // Reject text drops before a view is spent on them.
        if let Some(drop) = self.store.find_by_id(id).await?
            && drop.content.file_ref().is_none()
        {
            return Err(EngineError::Validation(
                "text drops have no file to download".into(),
            ));
        }

        let snapshot = self.retrieve(id, password).await?;
        let Some(file) = snapshot.content.file_ref() else {
            return Err(EngineError::Validation(
                "text drops have no file to download".into(),
            ));
        };

        match self.blobs.get(&file.blob_id).await? {
            Some(data) => Ok((snapshot, data)),
            None => {
                warn!(drop_id = %id, blob_id = %file.blob_id, "blob missing for live drop");
                Err(EngineError::NotFound)
            }
        }
    }

    /// Delete a drop with its delete token.
    ///
    /// A file drop's blob is released first; a release failure is logged
    /// and the record is removed regardless.
    pub async fn delete(&self, id: &str, delete_token: &str) -> Result<(), EngineError> {
        let Some(drop) = self.store.find_by_id(id).await? else {
            return Err(EngineError::NotFound);
        };

        let matches: bool = drop
            .delete_token
            .as_bytes()
            .ct_eq(delete_token.as_bytes())
            .into();
        if !matches {
            self.metrics.increment_delete_unauthorized();
            warn!(drop_id = %id, "delete rejected: token mismatch");
            return Err(EngineError::Unauthorized);
        }

        if let Some(file) = drop.content.file_ref()
            && let Err(e) = self.blobs.release(&file.blob_id).await
        {
            warn!(drop_id = %id, blob_id = %file.blob_id, error = %e, "failed to release blob");
        }

        if !self.store.delete_by_id(id).await? {
            return Err(EngineError::NotFound);
        }

        self.metrics.increment_deleted();
        info!(drop_id = %id, "drop deleted");
        Ok(())
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// The blob store backing file drops.
    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// The engine's creation tunables.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl std::fmt::Debug for DropEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
