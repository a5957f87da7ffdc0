//! Network health monitor
//!
//! Periodic reachability probes against the backend. Transitions are
//! broadcast so the background sync can replay queued mutations when
//! connectivity returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use gr_core::error::AppResult;
use gr_core::ports::NetworkMonitorPort;

use crate::backend::SupabaseClient;

struct MonitorInner {
    client: Arc<SupabaseClient>,
    interval: Duration,
    online: AtomicBool,
    transitions: broadcast::Sender<bool>,
}

pub struct HttpNetworkMonitor {
    inner: Arc<MonitorInner>,
    started: AtomicBool,
}

impl HttpNetworkMonitor {
    pub fn new(client: Arc<SupabaseClient>, interval: Duration) -> Self {
        let (transitions, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(MonitorInner {
                client,
                interval,
                // Optimistic until the first probe settles.
                online: AtomicBool::new(true),
                transitions,
            }),
            started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl NetworkMonitorPort for HttpNetworkMonitor {
    async fn start(&self) -> AppResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                let reachable = inner.client.health().await.is_ok();
                let was = inner.online.swap(reachable, Ordering::SeqCst);
                if was != reachable {
                    info!(online = reachable, "network state changed");
                    let _ = inner.transitions.send(reachable);
                } else {
                    debug!(online = reachable, "network probe");
                }
                tokio::time::sleep(inner.interval).await;
            }
        });
        Ok(())
    }

    fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.inner.transitions.subscribe()
    }
}
