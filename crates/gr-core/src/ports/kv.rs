//! Key-value store port
//!
//! Local persistent storage. Used by the startup storage probe
//! (set/get/remove round-trip) and by the store persistence layers.

use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    async fn remove(&self, key: &str) -> AppResult<()>;
}
