//! Auth port
//!
//! Exposes the current authenticated identity and a subscribable stream
//! of identity transitions. The profile store is the only cross-store
//! consumer.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::AuthEvent;

pub trait AuthPort: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
