//! Profile store
//!
//! Client-side cache of the current user's profile and streak,
//! reconciled with the backend and reset on identity change. Fetches are
//! idempotent per identity, transient failures are retried on a fixed
//! delay up to a bound, and validation failures are terminal.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::broadcast;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use gr_core::auth::AuthEvent;
use gr_core::error::AppError;
use gr_core::ports::{
    AuthPort, BackendPort, MutationQueuePort, NetworkMonitorPort, NotificationPort,
    ProfileStateRepositoryPort,
};
use gr_core::profile::{DailyGoal, Profile, ProfilePatch, ReminderTime};
use gr_core::state::PersistedProfileState;
use gr_core::streak::Streak;
use gr_core::sync::QueuedMutation;
use gr_core::throwback::ThrowbackFrequency;

/// Retries after the initial attempt, for transient failures only.
pub const FETCH_MAX_RETRIES: u32 = 2;

/// Fixed delay between retry attempts.
pub const FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Reactive store state. Cloned out as a snapshot; all mutation goes
/// through the store's own actions.
#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub streak: Option<Streak>,
    pub loading: bool,
    pub error: Option<String>,
    pub streak_error: Option<String>,
    /// Identity the cached profile belongs to.
    pub loaded_for: Option<Uuid>,
}

/// Dependency grouping for [`ProfileStore`] construction.
pub struct ProfileStoreDeps {
    pub backend: Arc<dyn BackendPort>,
    pub auth: Arc<dyn AuthPort>,
    pub notifications: Arc<dyn NotificationPort>,
    pub network: Arc<dyn NetworkMonitorPort>,
    pub mutation_queue: Arc<dyn MutationQueuePort>,
    pub state_repo: Arc<dyn ProfileStateRepositoryPort>,
}

pub struct ProfileStore {
    backend: Arc<dyn BackendPort>,
    auth: Arc<dyn AuthPort>,
    notifications: Arc<dyn NotificationPort>,
    network: Arc<dyn NetworkMonitorPort>,
    mutation_queue: Arc<dyn MutationQueuePort>,
    state_repo: Arc<dyn ProfileStateRepositoryPort>,
    state: Mutex<ProfileState>,
}

impl ProfileStore {
    pub fn new(deps: ProfileStoreDeps) -> Self {
        let ProfileStoreDeps {
            backend,
            auth,
            notifications,
            network,
            mutation_queue,
            state_repo,
        } = deps;

        Self {
            backend,
            auth,
            notifications,
            network,
            mutation_queue,
            state_repo,
            state: Mutex::new(ProfileState::default()),
        }
    }

    pub fn snapshot(&self) -> ProfileState {
        self.lock().clone()
    }

    /// Restore persisted state from a previous session. Migrations run
    /// inside the repository before the typed shape is produced.
    pub async fn hydrate(&self) {
        match self.state_repo.load().await {
            Ok(Some(persisted)) => {
                let mut state = self.lock();
                state.profile = persisted.profile;
                state.streak = persisted.streak;
                state.loaded_for = persisted.loaded_for;
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to load persisted profile state"),
        }
    }

    /// Subscribe to auth transitions; any identity change resets the
    /// store to defaults so no identity's data leaks into another's
    /// session.
    pub fn attach_auth_listener(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = store.auth.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.on_auth_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth event stream lagged, resetting store");
                        store.reset().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Fetch the profile for the current identity.
    ///
    /// `retry` is 0 for caller-initiated fetches; retry invocations are
    /// scheduled internally. The returned future settles when this
    /// attempt settles — a scheduled retry runs later as its own task, so
    /// callers must not assume settling means data is present.
    pub fn fetch_profile(self: &Arc<Self>, retry: u32) -> BoxFuture<'static, ()> {
        let store = Arc::clone(self);
        async move {
            let span = info_span!("store.profile.fetch", retry);
            store.fetch_attempt(retry).instrument(span).await;
        }
        .boxed()
    }

    async fn fetch_attempt(self: Arc<Self>, retry: u32) {
        let Some(user_id) = self.auth.current_user() else {
            debug!("no authenticated user, nothing to fetch");
            self.lock().loading = false;
            return;
        };

        {
            let mut state = self.lock();
            if retry == 0 && state.loaded_for == Some(user_id) && state.profile.is_some() {
                debug!(%user_id, "profile already loaded, skipping fetch");
                return;
            }
            state.loading = true;
            state.error = None;
        }

        match self.backend.fetch_profile(user_id).await {
            Ok(Some(profile)) => {
                // Identity guard: drop results that land after a sign-out
                // or an identity switch.
                if self.auth.current_user() != Some(user_id) {
                    warn!(%user_id, "identity changed mid-fetch, discarding result");
                    return;
                }
                {
                    let mut state = self.lock();
                    state.profile = Some(profile);
                    state.loaded_for = Some(user_id);
                    state.loading = false;
                    state.error = None;
                }
                self.persist().await;

                // Streak refresh is best-effort; its failure never
                // invalidates the fetched profile.
                self.refresh_streak().await;
            }
            Ok(None) | Err(AppError::NotFound) => {
                debug!(%user_id, "no profile row yet");
                self.lock().loading = false;
            }
            Err(err @ AppError::Validation { .. }) => {
                // Bad data shape; retrying cannot help.
                let mut state = self.lock();
                state.error = Some(err.to_string());
                state.loading = false;
            }
            Err(err) => {
                if retry < FETCH_MAX_RETRIES {
                    warn!(error = %err, retry, "profile fetch failed, retry scheduled");
                    let store = Arc::clone(&self);
                    tokio::spawn(async move {
                        tokio::time::sleep(FETCH_RETRY_DELAY).await;
                        store.clone().fetch_profile(retry + 1).await;
                    });
                } else {
                    warn!(error = %err, "profile fetch failed after final retry");
                    let mut state = self.lock();
                    state.error = Some(err.to_string());
                    state.loading = false;
                }
            }
        }
    }

    /// Fetch streak data independently of the profile. An absent record
    /// is a valid state for new users; failures touch `streak_error`
    /// only.
    pub async fn refresh_streak(&self) {
        let Some(user_id) = self.auth.current_user() else {
            return;
        };

        match self.backend.fetch_streak(user_id).await {
            Ok(streak) => {
                {
                    let mut state = self.lock();
                    state.streak = streak;
                    state.streak_error = None;
                }
                self.persist().await;
            }
            Err(err) => {
                warn!(error = %err, "streak refresh failed");
                self.lock().streak_error = Some(err.to_string());
            }
        }
    }

    /// Save throwback preference changes.
    pub async fn update_throwback_preferences(&self, patch: ProfilePatch) {
        let span = info_span!("store.profile.update_throwback");
        self.apply_patch(patch, false).instrument(span).await;
    }

    /// Save daily reminder settings and reconcile OS reminder scheduling
    /// with the persisted result.
    pub async fn update_daily_reminder_settings(&self, patch: ProfilePatch) {
        let span = info_span!("store.profile.update_reminders");
        self.apply_patch(patch, true).instrument(span).await;
    }

    async fn apply_patch(&self, patch: ProfilePatch, reschedule: bool) {
        // Schema gate: an invalid payload never reaches the network.
        if let Err(err) = patch.validate() {
            self.lock().error = Some(err.to_string());
            return;
        }

        let Some(user_id) = self.auth.current_user() else {
            self.lock().error = Some("not signed in".to_string());
            return;
        };

        if !self.network.is_online() {
            debug!(%user_id, "offline, queueing profile mutation");
            self.apply_patch_locally(&patch);
            if let Err(err) = self
                .mutation_queue
                .enqueue(QueuedMutation::ProfilePatch {
                    user_id,
                    patch,
                })
                .await
            {
                warn!(error = %err, "failed to queue offline mutation");
            }
            self.persist().await;
            if reschedule {
                self.sync_reminder_schedule().await;
            }
            return;
        }

        match self.backend.update_profile(user_id, &patch).await {
            Ok(updated) => {
                {
                    let mut state = self.lock();
                    state.profile = Some(updated);
                    state.loaded_for = Some(user_id);
                    state.error = None;
                }
                self.persist().await;
                if reschedule {
                    self.sync_reminder_schedule().await;
                }
            }
            Err(err) => {
                self.lock().error = Some(err.to_string());
            }
        }
    }

    /// Optimistic merge of a validated patch into the cached profile.
    fn apply_patch_locally(&self, patch: &ProfilePatch) {
        let mut state = self.lock();
        let Some(profile) = state.profile.as_mut() else {
            return;
        };

        if let Some(username) = &patch.username {
            profile.username = Some(username.clone());
        }
        if let Some(completed) = patch.onboarding_completed {
            profile.onboarding_completed = completed;
        }
        if let Some(enabled) = patch.notifications_enabled {
            profile.notifications_enabled = enabled;
        }
        if let Some(token) = &patch.push_token {
            profile.push_token = Some(token.clone());
        }
        if let Some(time) = patch.reminder_time.as_deref() {
            profile.reminder_time = ReminderTime::parse(time).ok();
        }
        if let Some(enabled) = patch.throwback_enabled {
            profile.throwback_enabled = enabled;
        }
        if let Some(frequency) = patch.throwback_frequency.as_deref() {
            profile.throwback_frequency = ThrowbackFrequency::parse(frequency);
        }
        if let Some(goal) = patch.daily_gratitude_goal {
            profile.daily_gratitude_goal = DailyGoal::try_from(goal).ok();
        }
    }

    /// Schedule the daily reminder when enabled with a usable time,
    /// cancel everything otherwise. A missing or unparseable persisted
    /// time always cancels.
    async fn sync_reminder_schedule(&self) {
        let (enabled, time) = {
            let state = self.lock();
            match &state.profile {
                Some(profile) => (profile.notifications_enabled, profile.reminder_time),
                None => (false, None),
            }
        };

        let result = match (enabled, time) {
            (true, Some(time)) => self.notifications.schedule_daily_reminder(time).await,
            _ => self.notifications.cancel_all_reminders().await,
        };

        if let Err(err) = result {
            warn!(error = %err, "reminder scheduling side effect failed");
        }
    }

    async fn on_auth_event(&self, event: AuthEvent) {
        let stale = {
            let state = self.lock();
            state.loaded_for != event.user_id() || state.profile.is_some() && event.user_id().is_none()
        };
        if stale {
            debug!(?event, "auth identity transition, resetting profile store");
            self.reset().await;
        }
    }

    /// Reset to initial defaults and clear persisted state.
    pub async fn reset(&self) {
        *self.lock() = ProfileState::default();
        if let Err(err) = self.state_repo.clear().await {
            warn!(error = %err, "failed to clear persisted profile state");
        }
    }

    async fn persist(&self) {
        let persisted = {
            let state = self.lock();
            PersistedProfileState::current(
                state.profile.clone(),
                state.streak,
                state.loaded_for,
            )
        };
        if let Err(err) = self.state_repo.save(&persisted).await {
            warn!(error = %err, "failed to persist profile state");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProfileState> {
        self.state.lock().expect("profile state lock poisoned")
    }
}
