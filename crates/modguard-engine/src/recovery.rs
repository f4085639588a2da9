//! Re-enqueueing of requests stuck in `pending`

use crate::queue::{Enqueue, WorkQueue};
use chrono::Utc;
use modguard_store::{ModerationStore, StoreResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Periodic sweep over pending requests older than a threshold.
///
/// Covers submissions that were never enqueued (full queue), jobs that
/// failed on a store error, and anything in flight when the process died.
#[derive(Clone)]
pub struct RecoverySweeper {
    store: Arc<dyn ModerationStore>,
    queue: WorkQueue,
    stale_after: Duration,
    batch: u32,
}

impl RecoverySweeper {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        queue: WorkQueue,
        stale_after: Duration,
        batch: u32,
    ) -> Self {
        Self {
            store,
            queue,
            stale_after,
            batch,
        }
    }

    /// Re-enqueue stale pending requests once. Returns how many were queued.
    pub async fn sweep_once(&self) -> StoreResult<usize> {
        let cutoff = Utc::now() - chrono::Duration::milliseconds(self.stale_after.as_millis() as i64);

        let stale = self.store.pending_before(cutoff, self.batch).await?;
        let mut queued = 0;

        for request_id in &stale {
            match self.queue.enqueue(request_id) {
                Enqueue::Queued => queued += 1,
                Enqueue::Duplicate => {}
                Enqueue::Full => {
                    warn!("Work queue full, deferring remaining recovery to next sweep");
                    break;
                }
                Enqueue::Closed => break,
            }
        }

        if queued > 0 {
            info!("Recovered {} stale pending requests", queued);
        } else {
            debug!(candidates = stale.len(), "Recovery sweep found nothing to enqueue");
        }

        Ok(queued)
    }

    /// Sweep immediately and then every `interval` until `shutdown` fires
    pub fn spawn(self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_once().await {
                            error!("Recovery sweep failed: {}", e);
                        }
                    }
                    _ = shutdown.changed() => {
                        debug!("Recovery sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}
