//! Offline mutation queue
//!
//! Durable FIFO queue persisted through the key-value store. A corrupt
//! queue is dropped rather than allowed to wedge every future replay.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use gr_core::error::{AppError, AppResult};
use gr_core::ports::{KeyValueStorePort, MutationQueuePort};
use gr_core::sync::QueuedMutation;

pub const MUTATION_QUEUE_KEY: &str = "mutation_queue";

pub struct KvMutationQueue {
    kv: Arc<dyn KeyValueStorePort>,
    lock: Mutex<()>,
}

impl KvMutationQueue {
    pub fn new(kv: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            kv,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> AppResult<Vec<QueuedMutation>> {
        match self.kv.get(MUTATION_QUEUE_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(queue) => Ok(queue),
                Err(err) => {
                    warn!(error = %err, "dropping corrupt mutation queue");
                    Ok(Vec::new())
                }
            },
        }
    }

    async fn store(&self, queue: &[QueuedMutation]) -> AppResult<()> {
        if queue.is_empty() {
            return self.kv.remove(MUTATION_QUEUE_KEY).await;
        }
        let raw = serde_json::to_string(queue)
            .map_err(|err| AppError::Unknown(format!("serialize mutation queue failed: {err}")))?;
        self.kv.set(MUTATION_QUEUE_KEY, &raw).await
    }
}

#[async_trait]
impl MutationQueuePort for KvMutationQueue {
    async fn enqueue(&self, mutation: QueuedMutation) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut queue = self.load().await?;
        queue.push(mutation);
        self.store(&queue).await
    }

    async fn drain(&self) -> AppResult<Vec<QueuedMutation>> {
        let _guard = self.lock.lock().await;
        let queue = self.load().await?;
        self.kv.remove(MUTATION_QUEUE_KEY).await?;
        Ok(queue)
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.load().await?.len())
    }
}
