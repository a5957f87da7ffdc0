//! Mutation queue port
//!
//! Durable queue for mutations issued while offline. `drain` removes and
//! returns everything queued; replay failures re-enqueue.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::sync::QueuedMutation;

#[async_trait]
pub trait MutationQueuePort: Send + Sync {
    async fn enqueue(&self, mutation: QueuedMutation) -> AppResult<()>;

    async fn drain(&self) -> AppResult<Vec<QueuedMutation>>;

    async fn len(&self) -> AppResult<usize>;
}
