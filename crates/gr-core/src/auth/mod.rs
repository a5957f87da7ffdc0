//! Auth events
//!
//! The auth collaborator is external; the domain only defines the
//! identity-transition events other stores subscribe to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "user_id")]
pub enum AuthEvent {
    SignedIn(Uuid),
    SignedOut,
}

impl AuthEvent {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthEvent::SignedIn(id) => Some(*id),
            AuthEvent::SignedOut => None,
        }
    }
}
