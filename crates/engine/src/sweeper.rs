use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use linkvault_blob::BlobStore;
use linkvault_core::Clock;
use linkvault_store::DropStore;

use crate::engine::DropEngine;
use crate::metrics::EngineMetrics;

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep (default: 3600 seconds).
    pub interval: Duration,
    /// Whether to sweep once immediately on start rather than waiting for
    /// the first interval to elapse (default: true).
    pub sweep_on_start: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            sweep_on_start: true,
        }
    }
}

/// Something the sweeper failed to clean up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    /// The affected drop, or `None` when listing expired drops failed.
    pub drop_id: Option<String>,
    pub reason: String,
}

/// Outcome of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired drops found.
    pub examined: usize,
    /// Records actually removed by this sweep.
    pub removed: usize,
    /// Blobs released.
    pub blobs_released: usize,
    /// Per-drop failures; none of them stopped the sweep.
    pub errors: Vec<SweepFailure>,
}

/// Periodically removes expired drops and releases their blobs.
pub struct ExpirySweeper {
    store: Arc<dyn DropStore>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
    config: SweeperConfig,
    shutdown_rx: mpsc::Receiver<()>,
}

impl ExpirySweeper {
    /// Create a sweeper sharing the engine's stores, clock and metrics.
    ///
    /// Returns the sweeper and the sender that stops [`run`](Self::run).
    pub fn new(engine: &DropEngine, config: SweeperConfig) -> (Self, mpsc::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let sweeper = Self {
            store: Arc::clone(&engine.store),
            blobs: Arc::clone(&engine.blobs),
            clock: Arc::clone(&engine.clock),
            metrics: Arc::clone(&engine.metrics),
            config,
            shutdown_rx,
        };
        (sweeper, shutdown_tx)
    }

    /// Run until a shutdown signal arrives or the sender is dropped.
    pub async fn run(&mut self) {
        info!(interval_secs = self.config.interval.as_secs(), "expiry sweeper starting");

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !self.config.sweep_on_start {
            // The first tick completes immediately.
            ticker.tick().await;
        }

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("expiry sweeper received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        info!("expiry sweeper stopped");
    }

    /// Sweep every drop expired as of now.
    ///
    /// Each drop is handled in isolation: a failure is recorded in the
    /// report and the sweep moves on. Blob release failures are recorded
    /// but the record is still removed.
    pub async fn sweep_once(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        let expired = match self.store.find_all_expired(now).await {
            Ok(expired) => expired,
            Err(e) => {
                error!(error = %e, "expiry sweeper: failed to list expired drops");
                self.metrics.add_sweep_errors(1);
                report.errors.push(SweepFailure {
                    drop_id: None,
                    reason: e.to_string(),
                });
                return report;
            }
        };
        report.examined = expired.len();

        for drop in expired {
            if let Some(file) = drop.content.file_ref() {
                match self.blobs.release(&file.blob_id).await {
                    Ok(()) => report.blobs_released += 1,
                    Err(e) => {
                        warn!(
                            drop_id = %drop.id,
                            blob_id = %file.blob_id,
                            error = %e,
                            "expiry sweeper: failed to release blob"
                        );
                        report.errors.push(SweepFailure {
                            drop_id: Some(drop.id.clone()),
                            reason: format!("blob release: {e}"),
                        });
                    }
                }
            }

            match self.store.delete_by_id(&drop.id).await {
                Ok(true) => report.removed += 1,
                // Deleted concurrently by its owner or another sweep.
                Ok(false) => debug!(drop_id = %drop.id, "expiry sweeper: drop already gone"),
                Err(e) => {
                    warn!(drop_id = %drop.id, error = %e, "expiry sweeper: failed to delete drop");
                    report.errors.push(SweepFailure {
                        drop_id: Some(drop.id.clone()),
                        reason: format!("delete: {e}"),
                    });
                }
            }
        }

        self.metrics.add_swept(report.removed as u64);
        self.metrics.add_sweep_errors(report.errors.len() as u64);

        if report.examined > 0 || !report.errors.is_empty() {
            info!(
                examined = report.examined,
                removed = report.removed,
                blobs_released = report.blobs_released,
                errors = report.errors.len(),
                "expiry sweep complete"
            );
        }

        report
    }
}
