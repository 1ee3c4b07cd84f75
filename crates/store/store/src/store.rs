use async_trait::async_trait;
use chrono::{DateTime, Utc};

use linkvault_core::Drop;

use crate::error::StoreError;

/// Result of a conditional view-recording operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The view was counted. Carries the new `view_count`.
    Recorded { view_count: u32 },
    /// No drop with that id exists.
    Missing,
    /// The drop had expired (or its one-time view was consumed) by the time
    /// of the write.
    Expired,
    /// The drop had reached its download limit by the time of the write.
    Exhausted,
}

/// Trait for persisting drops.
///
/// The store is the single source of truth for drop state. Implementations
/// must be `Send + Sync` and safe for concurrent access; every mutation
/// touches exactly one record.
#[async_trait]
pub trait DropStore: Send + Sync {
    /// Insert a new drop.
    ///
    /// Returns [`StoreError::UniqueViolation`] if the id or delete token is
    /// already in use.
    async fn insert(&self, drop: &Drop) -> Result<(), StoreError>;

    /// Look up a drop by its public id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Drop>, StoreError>;

    /// Overwrite the mutable state of an existing drop.
    ///
    /// Returns [`StoreError::NotFound`] if the drop no longer exists.
    async fn save(&self, drop: &Drop) -> Result<(), StoreError>;

    /// Delete a drop. Returns `true` if the drop existed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// All drops whose `expires_at` is at or before `now`.
    ///
    /// The result is recomputed on every call.
    async fn find_all_expired(&self, now: DateTime<Utc>) -> Result<Vec<Drop>, StoreError>;

    /// Count one successful retrieval of a live drop.
    ///
    /// Increments `view_count` only if the drop is still live at `now`, and
    /// for one-time-view drops collapses `expires_at` to `now` in the same
    /// write. Backends that can do this as a single conditional update
    /// should override this; the default reads and then saves, so two racing
    /// callers may both succeed on the last slot.
    async fn record_view(&self, id: &str, now: DateTime<Utc>) -> Result<ViewOutcome, StoreError> {
        let Some(mut drop) = self.find_by_id(id).await? else {
            return Ok(ViewOutcome::Missing);
        };
        if drop.is_expired(now) {
            return Ok(ViewOutcome::Expired);
        }
        if drop.is_exhausted() {
            return Ok(ViewOutcome::Exhausted);
        }

        drop.view_count = drop.view_count.saturating_add(1);
        if drop.one_time_view {
            drop.expires_at = now;
        }

        match self.save(&drop).await {
            Ok(()) => Ok(ViewOutcome::Recorded {
                view_count: drop.view_count,
            }),
            Err(StoreError::NotFound(_)) => Ok(ViewOutcome::Missing),
            Err(e) => Err(e),
        }
    }
}
