use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use gr_core::error::{AppError, AppResult};
use gr_core::journal::GratitudeEntry;
use gr_core::ports::BackendPort;
use gr_core::profile::{Profile, ProfilePatch};
use gr_core::streak::Streak;

use super::client::SupabaseClient;
use super::rows::{EntryRow, ProfileRow, StreakRow};

/// [`BackendPort`] implementation over the PostgREST client.
pub struct BackendAdapter {
    client: Arc<SupabaseClient>,
}

impl BackendAdapter {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    fn by_id(user_id: Uuid) -> Vec<(&'static str, String)> {
        vec![("id", format!("eq.{user_id}")), ("select", "*".to_string())]
    }

    fn by_user(user_id: Uuid) -> Vec<(&'static str, String)> {
        vec![("user_id", format!("eq.{user_id}"))]
    }
}

#[async_trait]
impl BackendPort for BackendAdapter {
    async fn health(&self) -> AppResult<()> {
        self.client.health().await
    }

    async fn fetch_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let row = self
            .client
            .select_one::<ProfileRow>("profiles", &Self::by_id(user_id))
            .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> AppResult<Profile> {
        let row = self
            .client
            .update_returning::<ProfileRow>("profiles", &Self::by_id(user_id), patch)
            .await?
            .ok_or(AppError::NotFound)?;
        Profile::try_from(row)
    }

    async fn fetch_streak(&self, user_id: Uuid) -> AppResult<Option<Streak>> {
        let row = self
            .client
            .rpc::<Option<StreakRow>>("calculate_streak", &json!({ "p_user_id": user_id }))
            .await?;
        row.map(Streak::try_from).transpose()
    }

    async fn count_entries(&self, user_id: Uuid) -> AppResult<u64> {
        self.client
            .count("gratitude_entries", &Self::by_user(user_id))
            .await
    }

    async fn fetch_random_entry(&self, user_id: Uuid) -> AppResult<Option<GratitudeEntry>> {
        let row = self
            .client
            .rpc::<Option<EntryRow>>("random_gratitude_entry", &json!({ "p_user_id": user_id }))
            .await?;
        row.map(GratitudeEntry::try_from).transpose()
    }

    async fn register_push_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.client
            .rpc_void(
                "register_push_token",
                &json!({ "p_user_id": user_id, "p_token": token }),
            )
            .await
    }
}
