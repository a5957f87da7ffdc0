//! # gr-infra
//!
//! Infrastructure adapters for Gratia: the PostgREST-shaped backend
//! client, the file-backed key-value store, versioned state persistence
//! and migrations, the system clock, the network health monitor, the
//! offline mutation queue, the reminder bridge, and the auth session.

pub mod auth;
pub mod backend;
pub mod kv;
pub mod net;
pub mod notify;
pub mod queue;
pub mod state;
pub mod time;

pub use auth::AuthSession;
pub use backend::{BackendAdapter, SupabaseClient};
pub use kv::FileKeyValueStore;
pub use net::HttpNetworkMonitor;
pub use notify::ReminderBridge;
pub use queue::KvMutationQueue;
pub use state::{KvProfileStateRepository, KvThrowbackStateRepository, StateMigrator};
pub use time::SystemClock;
