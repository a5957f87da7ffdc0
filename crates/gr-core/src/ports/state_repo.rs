//! Persisted store state ports
//!
//! Versioned persistence for the profile and throwback stores, plus the
//! migration contract raw persisted values pass through before they are
//! deserialized into the current shapes.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::state::{PersistedProfileState, PersistedThrowbackState};

#[async_trait]
pub trait ProfileStateRepositoryPort: Send + Sync {
    async fn load(&self) -> AppResult<Option<PersistedProfileState>>;

    async fn save(&self, state: &PersistedProfileState) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;
}

#[async_trait]
pub trait ThrowbackStateRepositoryPort: Send + Sync {
    async fn load(&self) -> AppResult<Option<PersistedThrowbackState>>;

    async fn save(&self, state: &PersistedThrowbackState) -> AppResult<()>;
}

/// One schema migration step over the raw persisted JSON value.
pub trait StateMigrationPort: Send + Sync {
    fn from_version(&self) -> u32;

    fn migrate(&self, raw: serde_json::Value) -> serde_json::Value;
}
