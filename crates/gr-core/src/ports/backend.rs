//! Backend port - abstracts the hosted database API
//!
//! Table reads/writes and RPC calls against the hosted backend. "No rows"
//! is a valid empty result (`Ok(None)`), never an error; every failure is
//! already translated into an [`AppError`] variant by the adapter.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::journal::GratitudeEntry;
use crate::profile::{Profile, ProfilePatch};
use crate::streak::Streak;

#[async_trait]
pub trait BackendPort: Send + Sync {
    /// Cheap reachability probe used during bring-up.
    async fn health(&self) -> AppResult<()>;

    /// Fetch the user's profile row. `None` when no row exists yet.
    async fn fetch_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>>;

    /// Apply a partial update and return the echoed, updated profile.
    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> AppResult<Profile>;

    /// Compute the user's streak via the `calculate_streak` RPC.
    /// `None` is a valid state for users without entries.
    async fn fetch_streak(&self, user_id: Uuid) -> AppResult<Option<Streak>>;

    /// Total number of journal entries for the user.
    async fn count_entries(&self, user_id: Uuid) -> AppResult<u64>;

    /// One random past entry, or `None` when the journal is empty.
    async fn fetch_random_entry(&self, user_id: Uuid) -> AppResult<Option<GratitudeEntry>>;

    /// Register a push token via the `register_push_token` RPC.
    async fn register_push_token(&self, user_id: Uuid, token: &str) -> AppResult<()>;
}
