use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use gr_app::stores::profile::{ProfileStore, ProfileStoreDeps};
use gr_core::auth::AuthEvent;
use gr_core::error::{AppError, AppResult};
use gr_core::journal::GratitudeEntry;
use gr_core::ports::{
    AuthPort, BackendPort, MutationQueuePort, NetworkMonitorPort, NotificationPort,
    ProfileStateRepositoryPort,
};
use gr_core::profile::{Profile, ProfilePatch, ReminderTime};
use gr_core::state::PersistedProfileState;
use gr_core::streak::Streak;
use gr_core::sync::QueuedMutation;
use gr_core::throwback::ThrowbackFrequency;

fn profile_for(user_id: Uuid) -> Profile {
    Profile {
        id: user_id,
        username: Some("sam".into()),
        onboarding_completed: true,
        notifications_enabled: false,
        push_token: None,
        reminder_time: None,
        throwback_enabled: false,
        throwback_frequency: ThrowbackFrequency::Weekly,
        daily_gratitude_goal: None,
        created_at: None,
        updated_at: None,
    }
}

struct MockBackend {
    fetch_profile_calls: AtomicUsize,
    update_profile_calls: AtomicUsize,
    fetch_profile_results: Mutex<VecDeque<AppResult<Option<Profile>>>>,
    update_result: Mutex<Option<AppResult<Profile>>>,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fetch_profile_calls: AtomicUsize::new(0),
            update_profile_calls: AtomicUsize::new(0),
            fetch_profile_results: Mutex::new(VecDeque::new()),
            update_result: Mutex::new(None),
        })
    }

    fn push_fetch_result(&self, result: AppResult<Option<Profile>>) {
        self.fetch_profile_results.lock().unwrap().push_back(result);
    }

    fn set_update_result(&self, result: AppResult<Profile>) {
        *self.update_result.lock().unwrap() = Some(result);
    }
}

#[async_trait]
impl BackendPort for MockBackend {
    async fn health(&self) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> AppResult<Option<Profile>> {
        self.fetch_profile_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_profile_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn update_profile(&self, user_id: Uuid, _patch: &ProfilePatch) -> AppResult<Profile> {
        self.update_profile_calls.fetch_add(1, Ordering::SeqCst);
        self.update_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(profile_for(user_id)))
    }

    async fn fetch_streak(&self, _user_id: Uuid) -> AppResult<Option<Streak>> {
        Ok(None)
    }

    async fn count_entries(&self, _user_id: Uuid) -> AppResult<u64> {
        Ok(0)
    }

    async fn fetch_random_entry(&self, _user_id: Uuid) -> AppResult<Option<GratitudeEntry>> {
        Ok(None)
    }

    async fn register_push_token(&self, _user_id: Uuid, _token: &str) -> AppResult<()> {
        Ok(())
    }
}

struct MockAuth {
    current: Mutex<Option<Uuid>>,
    events: broadcast::Sender<AuthEvent>,
}

impl MockAuth {
    fn new(current: Option<Uuid>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            current: Mutex::new(current),
            events,
        })
    }

    fn transition(&self, event: AuthEvent) {
        *self.current.lock().unwrap() = event.user_id();
        let _ = self.events.send(event);
    }
}

impl AuthPort for MockAuth {
    fn current_user(&self) -> Option<Uuid> {
        *self.current.lock().unwrap()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[derive(Default)]
struct MockNotifications {
    scheduled: Mutex<Vec<ReminderTime>>,
    cancel_calls: AtomicUsize,
}

#[async_trait]
impl NotificationPort for MockNotifications {
    async fn request_permission(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn acquire_push_token(&self, _project_id: &str) -> AppResult<String> {
        Ok("token".into())
    }

    async fn schedule_daily_reminder(&self, time: ReminderTime) -> AppResult<()> {
        self.scheduled.lock().unwrap().push(time);
        Ok(())
    }

    async fn cancel_all_reminders(&self) -> AppResult<()> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockNetwork {
    online: AtomicBool,
    transitions: broadcast::Sender<bool>,
}

impl MockNetwork {
    fn new(online: bool) -> Arc<Self> {
        let (transitions, _) = broadcast::channel(16);
        Arc::new(Self {
            online: AtomicBool::new(online),
            transitions,
        })
    }
}

#[async_trait]
impl NetworkMonitorPort for MockNetwork {
    async fn start(&self) -> AppResult<()> {
        Ok(())
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.transitions.subscribe()
    }
}

#[derive(Default)]
struct MockQueue {
    items: Mutex<Vec<QueuedMutation>>,
}

#[async_trait]
impl MutationQueuePort for MockQueue {
    async fn enqueue(&self, mutation: QueuedMutation) -> AppResult<()> {
        self.items.lock().unwrap().push(mutation);
        Ok(())
    }

    async fn drain(&self) -> AppResult<Vec<QueuedMutation>> {
        Ok(std::mem::take(&mut *self.items.lock().unwrap()))
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.items.lock().unwrap().len())
    }
}

#[derive(Default)]
struct MockStateRepo {
    saved: Mutex<Option<PersistedProfileState>>,
    clear_calls: AtomicUsize,
}

#[async_trait]
impl ProfileStateRepositoryPort for MockStateRepo {
    async fn load(&self) -> AppResult<Option<PersistedProfileState>> {
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save(&self, state: &PersistedProfileState) -> AppResult<()> {
        *self.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

struct Fixture {
    backend: Arc<MockBackend>,
    auth: Arc<MockAuth>,
    notifications: Arc<MockNotifications>,
    network: Arc<MockNetwork>,
    queue: Arc<MockQueue>,
    repo: Arc<MockStateRepo>,
    store: Arc<ProfileStore>,
}

fn fixture(current_user: Option<Uuid>) -> Fixture {
    let backend = MockBackend::new();
    let auth = MockAuth::new(current_user);
    let notifications = Arc::new(MockNotifications::default());
    let network = MockNetwork::new(true);
    let queue = Arc::new(MockQueue::default());
    let repo = Arc::new(MockStateRepo::default());

    let store = Arc::new(ProfileStore::new(ProfileStoreDeps {
        backend: backend.clone(),
        auth: auth.clone(),
        notifications: notifications.clone(),
        network: network.clone(),
        mutation_queue: queue.clone(),
        state_repo: repo.clone(),
    }));

    Fixture {
        backend,
        auth,
        notifications,
        network,
        queue,
        repo,
        store,
    }
}

#[tokio::test]
async fn second_fetch_for_same_identity_is_a_noop() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.backend.push_fetch_result(Ok(Some(profile_for(user))));

    fx.store.fetch_profile(0).await;
    fx.store.fetch_profile(0).await;

    assert_eq!(fx.backend.fetch_profile_calls.load(Ordering::SeqCst), 1);
    let state = fx.store.snapshot();
    assert_eq!(state.loaded_for, Some(user));
    assert!(state.profile.is_some());
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_stop_after_three_attempts() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    // Every attempt fails with a retryable error.
    for _ in 0..10 {
        fx.backend
            .push_fetch_result(Err(AppError::Network("connection refused".into())));
    }

    fx.store.fetch_profile(0).await;
    // Let the scheduled retries run out.
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(fx.backend.fetch_profile_calls.load(Ordering::SeqCst), 3);
    let state = fx.store.snapshot();
    assert!(state.error.as_deref().unwrap().contains("connection refused"));
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn validation_failure_is_terminal_after_one_attempt() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.backend.push_fetch_result(Err(AppError::validation(
        "daily_gratitude_goal",
        "daily_gratitude_goal must be a positive integer",
    )));

    fx.store.fetch_profile(0).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(fx.backend.fetch_profile_calls.load(Ordering::SeqCst), 1);
    let state = fx.store.snapshot();
    assert!(state
        .error
        .as_deref()
        .unwrap()
        .contains("daily_gratitude_goal"));
}

#[tokio::test]
async fn missing_profile_row_is_a_non_error_outcome() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.backend.push_fetch_result(Ok(None));

    fx.store.fetch_profile(0).await;

    let state = fx.store.snapshot();
    assert!(state.error.is_none());
    assert!(state.profile.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn identity_transition_resets_cached_state() {
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let fx = fixture(Some(user_a));
    fx.backend.push_fetch_result(Ok(Some(profile_for(user_a))));

    fx.store.attach_auth_listener();
    fx.store.fetch_profile(0).await;
    assert_eq!(fx.store.snapshot().loaded_for, Some(user_a));

    fx.auth.transition(AuthEvent::SignedIn(user_b));
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    let state = fx.store.snapshot();
    assert_ne!(state.loaded_for, Some(user_a));
    assert!(state.profile.is_none());
    assert_eq!(fx.repo.clear_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sign_out_resets_cached_state() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.backend.push_fetch_result(Ok(Some(profile_for(user))));

    fx.store.attach_auth_listener();
    fx.store.fetch_profile(0).await;
    assert!(fx.store.snapshot().profile.is_some());

    fx.auth.transition(AuthEvent::SignedOut);
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    let state = fx.store.snapshot();
    assert!(state.profile.is_none());
    assert!(state.loaded_for.is_none());
}

#[tokio::test]
async fn zero_goal_patch_fails_before_any_network_call() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));

    let patch = ProfilePatch {
        daily_gratitude_goal: Some(0),
        ..Default::default()
    };
    fx.store.update_throwback_preferences(patch).await;

    assert_eq!(fx.backend.update_profile_calls.load(Ordering::SeqCst), 0);
    let state = fx.store.snapshot();
    assert!(state
        .error
        .as_deref()
        .unwrap()
        .contains("daily_gratitude_goal"));
}

#[tokio::test]
async fn reminder_update_schedules_when_enabled_with_time() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));

    let mut updated = profile_for(user);
    updated.notifications_enabled = true;
    updated.reminder_time = Some(ReminderTime::parse("08:30:00").unwrap());
    fx.backend.set_update_result(Ok(updated));

    let patch = ProfilePatch {
        notifications_enabled: Some(true),
        reminder_time: Some("08:30:00".into()),
        ..Default::default()
    };
    fx.store.update_daily_reminder_settings(patch).await;

    let scheduled = fx.notifications.scheduled.lock().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].to_string(), "08:30:00");
}

#[tokio::test]
async fn reminder_update_cancels_when_disabled_or_time_missing() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));

    // Echoed profile says enabled but the persisted time was unusable
    // and degraded to None: scheduling must cancel, not fire blind.
    let mut updated = profile_for(user);
    updated.notifications_enabled = true;
    updated.reminder_time = None;
    fx.backend.set_update_result(Ok(updated));

    let patch = ProfilePatch {
        notifications_enabled: Some(true),
        ..Default::default()
    };
    fx.store.update_daily_reminder_settings(patch).await;

    assert!(fx.notifications.scheduled.lock().unwrap().is_empty());
    assert_eq!(fx.notifications.cancel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn offline_update_is_queued_not_sent() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.network.online.store(false, Ordering::SeqCst);

    let patch = ProfilePatch {
        daily_gratitude_goal: Some(3),
        ..Default::default()
    };
    fx.store.update_throwback_preferences(patch).await;

    assert_eq!(fx.backend.update_profile_calls.load(Ordering::SeqCst), 0);
    let queued = fx.queue.items.lock().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].user_id(), user);
}

#[tokio::test]
async fn streak_failure_does_not_clear_profile() {
    let user = Uuid::new_v4();
    let fx = fixture(Some(user));
    fx.backend.push_fetch_result(Ok(Some(profile_for(user))));
    fx.store.fetch_profile(0).await;
    assert!(fx.store.snapshot().profile.is_some());

    // The mock returns Ok(None): a valid empty streak.
    fx.store.refresh_streak().await;
    let state = fx.store.snapshot();
    assert!(state.profile.is_some());
    assert!(state.streak.is_none());
    assert!(state.streak_error.is_none());
}
