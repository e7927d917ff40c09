use crate::error::{GatewayError, SyncError};
use crate::storage::OfflineQueue;
use crate::sync::gateway::{ConnectivityProbe, Gateway};
use planpin_proto::{Category, WriteBatch};
use tracing::{debug, info, warn};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub retained: usize,
}

/// Replays queued offline writes against the backend with partial-success
/// semantics.
///
/// Every batch is attempted independently and sequentially, never merged
/// into one request: an accepted batch is never resubmitted, a failed batch
/// is retained verbatim in its original position for the next invocation,
/// and one flaky batch type never blocks unrelated batches from being
/// acknowledged. The queue is only rewritten after all attempts complete, so
/// an invocation interrupted mid-flight leaves it exactly as it was.
///
/// Known gap, carried from the source behavior: inserts are not idempotent,
/// so a batch whose insert succeeded but whose acknowledgment was lost (for
/// example, the process died between the insert and the queue rewrite) will
/// be resubmitted and produce duplicate rows.
pub struct SyncEngine<G, P> {
    gateway: G,
    probe: P,
}

impl<G: Gateway, P: ConnectivityProbe> SyncEngine<G, P> {
    pub fn new(gateway: G, probe: P) -> Self {
        Self { gateway, probe }
    }

    /// Reconcile every category once, in a fixed order.
    pub async fn sync_all(&self, queue: &mut OfflineQueue) -> Result<SyncReport, SyncError> {
        let mut total = SyncReport::default();
        for category in Category::ALL {
            let report = self.sync_category(queue, category).await?;
            total.attempted += report.attempted;
            total.succeeded += report.succeeded;
            total.retained += report.retained;
        }
        Ok(total)
    }

    /// One reconciliation pass for a category.
    pub async fn sync_category(
        &self,
        queue: &mut OfflineQueue,
        category: Category,
    ) -> Result<SyncReport, SyncError> {
        if !self.probe.is_online().await {
            debug!(category = category.storage_key(), "offline, skipping sync");
            return Ok(SyncReport::default());
        }

        let pending = queue.drain(category)?;
        if pending.is_empty() {
            return Ok(SyncReport::default());
        }

        let attempted = pending.len();
        let mut retained = Vec::new();
        for batch in pending {
            match self.attempt(&batch).await {
                Ok(()) => {}
                Err(err) => {
                    warn!(
                        category = category.storage_key(),
                        rows = batch.row_count(),
                        %err,
                        "batch failed, retaining for next sync"
                    );
                    retained.push(batch);
                }
            }
        }

        let succeeded = attempted - retained.len();
        if succeeded > 0 {
            // Only rewrite when something was accepted; a fully failed pass
            // leaves the persisted sequence untouched.
            queue.replace(category, &retained)?;
        }
        info!(
            category = category.storage_key(),
            attempted,
            succeeded,
            retained = retained.len(),
            "sync pass complete"
        );
        Ok(SyncReport {
            attempted,
            succeeded,
            retained: retained.len(),
        })
    }

    async fn attempt(&self, batch: &WriteBatch) -> Result<(), GatewayError> {
        match batch {
            WriteBatch::Pins { rows, .. } => self.gateway.insert_pin_batch(rows).await,
            WriteBatch::FormResponse { row } => self.gateway.insert_form_response(row).await,
        }
    }
}
