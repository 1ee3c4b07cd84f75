use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use linkvault_core::Drop;
use linkvault_store::{DropStore, StoreError, ViewOutcome};

/// In-memory [`DropStore`] backed by a [`DashMap`].
///
/// Records are never evicted on read; expired drops stay until deleted or
/// swept. A second map indexes delete tokens to enforce their uniqueness.
/// When both maps are locked, `drops` is always taken first.
#[derive(Debug, Default)]
pub struct MemoryDropStore {
    drops: DashMap<String, Drop>,
    tokens: DashMap<String, String>,
}

impl MemoryDropStore {
    /// Create a new, empty in-memory drop store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored drops, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Returns `true` if no drops are stored.
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }
}

#[async_trait]
impl DropStore for MemoryDropStore {
    async fn insert(&self, drop: &Drop) -> Result<(), StoreError> {
        let Entry::Vacant(slot) = self.drops.entry(drop.id.clone()) else {
            return Err(StoreError::UniqueViolation(format!("id {}", drop.id)));
        };
        let Entry::Vacant(token_slot) = self.tokens.entry(drop.delete_token.clone()) else {
            return Err(StoreError::UniqueViolation("delete token".to_owned()));
        };

        token_slot.insert(drop.id.clone());
        slot.insert(drop.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Drop>, StoreError> {
        Ok(self.drops.get(id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, drop: &Drop) -> Result<(), StoreError> {
        let Some(mut existing) = self.drops.get_mut(&drop.id) else {
            return Err(StoreError::NotFound(drop.id.clone()));
        };
        // Only the mutable fields are written back.
        existing.view_count = drop.view_count;
        existing.expires_at = drop.expires_at;
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        match self.drops.remove(id) {
            Some((_, drop)) => {
                self.tokens.remove(&drop.delete_token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_all_expired(&self, now: DateTime<Utc>) -> Result<Vec<Drop>, StoreError> {
        Ok(self
            .drops
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn record_view(&self, id: &str, now: DateTime<Utc>) -> Result<ViewOutcome, StoreError> {
        // The shard write lock makes gate-and-increment a single step.
        let Some(mut drop) = self.drops.get_mut(id) else {
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
        Ok(ViewOutcome::Recorded {
            view_count: drop.view_count,
        })
    }
}
