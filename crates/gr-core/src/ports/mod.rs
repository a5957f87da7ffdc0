//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (stores and
//! use cases) and infrastructure implementations, keeping the core
//! independent of the hosted backend, the key-value store, and OS
//! services.

mod auth;
mod backend;
mod clock;
mod kv;
mod mutation_queue;
mod network;
mod notifications;
mod state_repo;

pub use auth::AuthPort;
pub use backend::BackendPort;
pub use clock::ClockPort;
pub use kv::KeyValueStorePort;
pub use mutation_queue::MutationQueuePort;
pub use network::NetworkMonitorPort;
pub use notifications::NotificationPort;
pub use state_repo::{
    ProfileStateRepositoryPort, StateMigrationPort, ThrowbackStateRepositoryPort,
};
