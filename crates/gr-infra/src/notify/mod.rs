//! Reminder bridge
//!
//! [`NotificationPort`] adapter for hosts without an OS notification
//! center of their own: permission is granted implicitly, push tokens
//! are stable per install, and the reminder schedule is recorded in the
//! key-value store for the delivery side to pick up. Actual delivery is
//! server-driven.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use gr_core::error::AppResult;
use gr_core::ports::{KeyValueStorePort, NotificationPort};
use gr_core::profile::ReminderTime;

pub const REMINDER_SCHEDULE_KEY: &str = "reminder_schedule";
pub const PUSH_TOKEN_KEY: &str = "push_token";

pub struct ReminderBridge {
    kv: Arc<dyn KeyValueStorePort>,
}

impl ReminderBridge {
    pub fn new(kv: Arc<dyn KeyValueStorePort>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl NotificationPort for ReminderBridge {
    async fn request_permission(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn acquire_push_token(&self, project_id: &str) -> AppResult<String> {
        if let Some(existing) = self.kv.get(PUSH_TOKEN_KEY).await? {
            return Ok(existing);
        }
        let token = format!("{project_id}:{}", Uuid::new_v4());
        self.kv.set(PUSH_TOKEN_KEY, &token).await?;
        Ok(token)
    }

    async fn schedule_daily_reminder(&self, time: ReminderTime) -> AppResult<()> {
        self.kv
            .set(REMINDER_SCHEDULE_KEY, &time.to_string())
            .await?;
        info!(%time, "daily reminder scheduled");
        Ok(())
    }

    async fn cancel_all_reminders(&self) -> AppResult<()> {
        self.kv.remove(REMINDER_SCHEDULE_KEY).await?;
        info!("reminders cancelled");
        Ok(())
    }
}
