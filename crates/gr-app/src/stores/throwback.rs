//! Throwback store
//!
//! Time-windowed feature gate for resurfacing a random past entry. Only
//! the `last_shown_at_ms` stamp is persisted; the fetched entry and
//! visibility flag are session-local.

use std::sync::{Arc, Mutex};

use tracing::{debug, info_span, warn, Instrument};

use gr_core::error::AppError;
use gr_core::journal::GratitudeEntry;
use gr_core::ports::{AuthPort, BackendPort, ClockPort, ThrowbackStateRepositoryPort};
use gr_core::state::PersistedThrowbackState;
use gr_core::throwback::{self, ThrowbackDecision, ThrowbackFrequency};

#[derive(Debug, Clone, Default)]
pub struct ThrowbackState {
    pub entry: Option<GratitudeEntry>,
    pub visible: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub last_shown_at_ms: Option<i64>,
}

/// Dependency grouping for [`ThrowbackStore`] construction.
pub struct ThrowbackStoreDeps {
    pub backend: Arc<dyn BackendPort>,
    pub auth: Arc<dyn AuthPort>,
    pub clock: Arc<dyn ClockPort>,
    pub state_repo: Arc<dyn ThrowbackStateRepositoryPort>,
}

pub struct ThrowbackStore {
    backend: Arc<dyn BackendPort>,
    auth: Arc<dyn AuthPort>,
    clock: Arc<dyn ClockPort>,
    state_repo: Arc<dyn ThrowbackStateRepositoryPort>,
    state: Mutex<ThrowbackState>,
}

impl ThrowbackStore {
    pub fn new(deps: ThrowbackStoreDeps) -> Self {
        let ThrowbackStoreDeps {
            backend,
            auth,
            clock,
            state_repo,
        } = deps;

        Self {
            backend,
            auth,
            clock,
            state_repo,
            state: Mutex::new(ThrowbackState::default()),
        }
    }

    pub fn snapshot(&self) -> ThrowbackState {
        self.lock().clone()
    }

    /// Restore the persisted cool-down stamp.
    pub async fn hydrate(&self) {
        match self.state_repo.load().await {
            Ok(Some(persisted)) => {
                self.lock().last_shown_at_ms = persisted.last_shown_at_ms;
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to load persisted throwback state"),
        }
    }

    /// Evaluate the gate once and, if both the content and the time gate
    /// pass, fetch a random past entry and make it visible.
    pub async fn check(&self, enabled: bool, frequency: ThrowbackFrequency) {
        let span = info_span!("store.throwback.check", frequency = frequency.as_str());
        self.check_inner(enabled, frequency).instrument(span).await;
    }

    async fn check_inner(&self, enabled: bool, frequency: ThrowbackFrequency) {
        if !enabled {
            debug!("throwbacks disabled");
            return;
        }

        let Some(user_id) = self.auth.current_user() else {
            debug!("no authenticated user");
            return;
        };

        let total_entries = match self.backend.count_entries(user_id).await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "entry count failed");
                self.lock().error = Some(err.to_string());
                return;
            }
        };

        let last_shown = self.lock().last_shown_at_ms;
        let now_ms = self.clock.now_ms();
        match throwback::evaluate(enabled, frequency, total_entries, last_shown, now_ms) {
            ThrowbackDecision::Skip(reason) => {
                debug!(?reason, total_entries, "throwback gate closed");
            }
            ThrowbackDecision::Show => self.fetch_and_show(user_id).await,
        }
    }

    async fn fetch_and_show(&self, user_id: uuid::Uuid) {
        self.lock().loading = true;

        match self.backend.fetch_random_entry(user_id).await {
            Ok(Some(entry)) => {
                let now_ms = self.clock.now_ms();
                {
                    let mut state = self.lock();
                    state.entry = Some(entry);
                    state.visible = true;
                    state.loading = false;
                    state.error = None;
                    state.last_shown_at_ms = Some(now_ms);
                }
                self.persist_stamp(Some(now_ms)).await;
            }
            Ok(None) => {
                // Count said there was history, but nothing came back.
                debug!("no entry available for throwback");
                self.lock().loading = false;
            }
            Err(err @ AppError::Validation { .. }) => {
                let mut state = self.lock();
                state.entry = None;
                state.visible = false;
                state.loading = false;
                state.error = Some(err.to_string());
            }
            Err(err) => {
                warn!(error = %err, "random entry fetch failed");
                let mut state = self.lock();
                state.loading = false;
                state.error = Some(err.to_string());
            }
        }
    }

    pub fn dismiss(&self) {
        let mut state = self.lock();
        state.visible = false;
        state.entry = None;
    }

    async fn persist_stamp(&self, last_shown_at_ms: Option<i64>) {
        let persisted = PersistedThrowbackState::current(last_shown_at_ms);
        if let Err(err) = self.state_repo.save(&persisted).await {
            warn!(error = %err, "failed to persist throwback stamp");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ThrowbackState> {
        self.state.lock().expect("throwback state lock poisoned")
    }
}
