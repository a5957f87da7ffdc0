//! Offline mutation model
//!
//! Mutations issued while offline are queued and replayed by the
//! background sync service once connectivity returns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::ProfilePatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QueuedMutation {
    ProfilePatch { user_id: Uuid, patch: ProfilePatch },
}

impl QueuedMutation {
    pub fn user_id(&self) -> Uuid {
        match self {
            QueuedMutation::ProfilePatch { user_id, .. } => *user_id,
        }
    }
}
