//! Background mutation sync
//!
//! Replays mutations queued while offline. Runs once during the
//! enhancement phase and again on every offline→online transition.
//! Poison mutations (validation failures) are dropped so they cannot
//! wedge the queue; transient failures re-enqueue everything left.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info_span, warn, Instrument};

use gr_core::error::{AppError, AppResult};
use gr_core::ports::{BackendPort, MutationQueuePort, NetworkMonitorPort};
use gr_core::sync::QueuedMutation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub dropped: usize,
    pub requeued: usize,
}

pub struct BackgroundSync {
    backend: Arc<dyn BackendPort>,
    queue: Arc<dyn MutationQueuePort>,
    network: Arc<dyn NetworkMonitorPort>,
}

impl BackgroundSync {
    pub fn new(
        backend: Arc<dyn BackendPort>,
        queue: Arc<dyn MutationQueuePort>,
        network: Arc<dyn NetworkMonitorPort>,
    ) -> Self {
        Self {
            backend,
            queue,
            network,
        }
    }

    /// Attach the connectivity listener. Each offline→online transition
    /// triggers a replay in the listener task.
    pub async fn start(self: &Arc<Self>) -> AppResult<()> {
        let sync = Arc::clone(self);
        let mut transitions = self.network.subscribe();
        tokio::spawn(async move {
            loop {
                match transitions.recv().await {
                    Ok(true) => {
                        let span = info_span!("sync.replay_on_reconnect");
                        if let Err(err) = sync.replay().instrument(span).await {
                            warn!(error = %err, "replay on reconnect failed");
                        }
                    }
                    Ok(false) => debug!("network went offline"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "network transition stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(())
    }

    /// Drain the queue and apply each mutation in order.
    pub async fn replay(&self) -> AppResult<ReplayReport> {
        let mutations = self.queue.drain().await?;
        if mutations.is_empty() {
            return Ok(ReplayReport::default());
        }

        debug!(pending = mutations.len(), "replaying queued mutations");
        let mut report = ReplayReport::default();
        let mut pending = mutations.into_iter();

        while let Some(mutation) = pending.next() {
            match &mutation {
                QueuedMutation::ProfilePatch { user_id, patch } => {
                    match self.backend.update_profile(*user_id, patch).await {
                        Ok(_) => report.applied += 1,
                        Err(AppError::Validation { .. }) | Err(AppError::NotFound) => {
                            warn!(%user_id, "dropping unreplayable queued mutation");
                            report.dropped += 1;
                        }
                        Err(err) => {
                            // Transient failure: keep this mutation and
                            // everything behind it for the next replay.
                            warn!(error = %err, "transient replay failure, re-queueing");
                            self.queue.enqueue(mutation.clone()).await?;
                            report.requeued += 1;
                            for rest in pending.by_ref() {
                                self.queue.enqueue(rest).await?;
                                report.requeued += 1;
                            }
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
