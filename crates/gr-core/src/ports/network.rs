//! Network monitor port
//!
//! Best-effort connectivity tracking. Consumers treat `is_online` as a
//! hint; transitions are broadcast so the background sync can replay
//! queued mutations when connectivity returns.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::AppResult;

#[async_trait]
pub trait NetworkMonitorPort: Send + Sync {
    async fn start(&self) -> AppResult<()>;

    fn is_online(&self) -> bool;

    /// Receives `true` on offline→online transitions, `false` on the reverse.
    fn subscribe(&self) -> broadcast::Receiver<bool>;
}
