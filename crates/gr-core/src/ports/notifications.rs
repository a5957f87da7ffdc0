//! Notification port
//!
//! Permission requests, push-token acquisition, and local reminder
//! scheduling. Delivery itself happens outside the app.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::profile::ReminderTime;

#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Ask the platform for notification permission. `false` means denied.
    async fn request_permission(&self) -> AppResult<bool>;

    /// Acquire a push token scoped to the given project identifier.
    async fn acquire_push_token(&self, project_id: &str) -> AppResult<String>;

    async fn schedule_daily_reminder(&self, time: ReminderTime) -> AppResult<()>;

    async fn cancel_all_reminders(&self) -> AppResult<()>;
}
