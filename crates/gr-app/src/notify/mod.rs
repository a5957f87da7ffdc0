//! Push-token registration
//!
//! Permission request, token acquisition scoped to the project
//! identifier, and registration with the backend. Delivery of reminders
//! is server-driven; nothing here schedules pushes itself.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use gr_core::error::AppError;
use gr_core::ports::{BackendPort, NotificationPort};

#[derive(Debug, thiserror::Error)]
pub enum RegisterPushTokenError {
    #[error("notification permission denied")]
    PermissionDenied,
    #[error(transparent)]
    App(#[from] AppError),
}

pub struct RegisterPushToken {
    notifications: Arc<dyn NotificationPort>,
    backend: Arc<dyn BackendPort>,
}

impl RegisterPushToken {
    pub fn new(notifications: Arc<dyn NotificationPort>, backend: Arc<dyn BackendPort>) -> Self {
        Self {
            notifications,
            backend,
        }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        project_id: &str,
    ) -> Result<String, RegisterPushTokenError> {
        let span = info_span!("usecase.register_push_token", %user_id);
        self.execute_inner(user_id, project_id).instrument(span).await
    }

    async fn execute_inner(
        &self,
        user_id: Uuid,
        project_id: &str,
    ) -> Result<String, RegisterPushTokenError> {
        if !self.notifications.request_permission().await? {
            return Err(RegisterPushTokenError::PermissionDenied);
        }

        let token = self.notifications.acquire_push_token(project_id).await?;
        self.backend.register_push_token(user_id, &token).await?;
        info!("push token registered");
        Ok(token)
    }
}
