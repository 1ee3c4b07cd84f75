use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking drop lifecycle outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Drops created.
    pub created: AtomicU64,
    /// Successful retrievals (including downloads).
    pub retrieved: AtomicU64,
    /// Retrievals rejected because the drop had expired.
    pub rejected_expired: AtomicU64,
    /// Retrievals rejected because the download limit was reached.
    pub rejected_exhausted: AtomicU64,
    /// Retrievals rejected for a missing or wrong password.
    pub rejected_password: AtomicU64,
    /// Drops deleted by token.
    pub deleted: AtomicU64,
    /// Delete attempts with a wrong token.
    pub delete_unauthorized: AtomicU64,
    /// Drops removed by the expiry sweeper.
    pub swept: AtomicU64,
    /// Per-drop failures during sweeps.
    pub sweep_errors: AtomicU64,
}

impl EngineMetrics {
    pub fn increment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retrieved(&self) {
        self.retrieved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_expired(&self) {
        self.rejected_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_exhausted(&self) {
        self.rejected_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_password(&self) {
        self.rejected_password.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_delete_unauthorized(&self) {
        self.delete_unauthorized.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `n` to the swept counter.
    pub fn add_swept(&self, n: u64) {
        self.swept.fetch_add(n, Ordering::Relaxed);
    }

    /// Add `n` to the sweep error counter.
    pub fn add_sweep_errors(&self, n: u64) {
        self.sweep_errors.fetch_add(n, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            retrieved: self.retrieved.load(Ordering::Relaxed),
            rejected_expired: self.rejected_expired.load(Ordering::Relaxed),
            rejected_exhausted: self.rejected_exhausted.load(Ordering::Relaxed),
            rejected_password: self.rejected_password.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            delete_unauthorized: self.delete_unauthorized.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            sweep_errors: self.sweep_errors.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`EngineMetrics`] at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub retrieved: u64,
    pub rejected_expired: u64,
    pub rejected_exhausted: u64,
    pub rejected_password: u64,
    pub deleted: u64,
    pub delete_unauthorized: u64,
    pub swept: u64,
    pub sweep_errors: u64,
}
