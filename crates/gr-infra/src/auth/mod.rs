//! Auth session
//!
//! Holds the current authenticated identity and broadcasts transitions.
//! The host wires its auth callbacks into `sign_in`/`sign_out`; the
//! profile store consumes the event stream through [`AuthPort`].

use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use gr_core::auth::AuthEvent;
use gr_core::ports::AuthPort;

pub struct AuthSession {
    current: RwLock<Option<Uuid>>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            events,
        }
    }

    pub fn sign_in(&self, user_id: Uuid) {
        *self.current.write().expect("auth session lock poisoned") = Some(user_id);
        info!(%user_id, "signed in");
        let _ = self.events.send(AuthEvent::SignedIn(user_id));
    }

    pub fn sign_out(&self) {
        *self.current.write().expect("auth session lock poisoned") = None;
        info!("signed out");
        let _ = self.events.send(AuthEvent::SignedOut);
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthPort for AuthSession {
    fn current_user(&self) -> Option<Uuid> {
        *self.current.read().expect("auth session lock poisoned")
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
