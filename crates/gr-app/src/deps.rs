//! # Application Dependencies
//!
//! Dependency grouping for application-layer construction.
//!
//! **Note**: this is NOT a Builder pattern — no build steps, no default
//! values, no hidden logic, just parameter grouping. The struct fields
//! ARE the dependency manifest.

use std::sync::Arc;

use gr_core::ports::*;

/// Everything the application layer needs, as ports.
pub struct AppDeps {
    // Backend
    pub backend: Arc<dyn BackendPort>,

    // Local persistence
    pub kv: Arc<dyn KeyValueStorePort>,
    pub profile_state_repo: Arc<dyn ProfileStateRepositoryPort>,
    pub throwback_state_repo: Arc<dyn ThrowbackStateRepositoryPort>,

    // Identity
    pub auth: Arc<dyn AuthPort>,

    // Platform services
    pub notifications: Arc<dyn NotificationPort>,
    pub network: Arc<dyn NetworkMonitorPort>,

    // Offline sync
    pub mutation_queue: Arc<dyn MutationQueuePort>,

    // System
    pub clock: Arc<dyn ClockPort>,
}
