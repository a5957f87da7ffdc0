use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

use gr_app::stores::throwback::{ThrowbackStore, ThrowbackStoreDeps};
use gr_core::auth::AuthEvent;
use gr_core::error::{AppError, AppResult};
use gr_core::journal::{GratitudeEntry, Statements};
use gr_core::ports::{AuthPort, BackendPort, ClockPort, ThrowbackStateRepositoryPort};
use gr_core::profile::{Profile, ProfilePatch};
use gr_core::state::PersistedThrowbackState;
use gr_core::streak::Streak;
use gr_core::throwback::ThrowbackFrequency;

const NOW_MS: i64 = 1_700_000_000_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn entry_for(user_id: Uuid) -> GratitudeEntry {
    GratitudeEntry {
        id: Uuid::new_v4(),
        user_id,
        entry_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        statements: Statements::try_from(vec!["morning coffee".to_string()]).unwrap(),
        created_at: None,
    }
}

struct MockBackend {
    entry_count: AtomicI64,
    count_calls: AtomicUsize,
    random_calls: AtomicUsize,
    random_result: Mutex<Option<AppResult<Option<GratitudeEntry>>>>,
    user_id: Uuid,
}

impl MockBackend {
    fn new(user_id: Uuid, entry_count: u64) -> Arc<Self> {
        Arc::new(Self {
            entry_count: AtomicI64::new(entry_count as i64),
            count_calls: AtomicUsize::new(0),
            random_calls: AtomicUsize::new(0),
            random_result: Mutex::new(None),
            user_id,
        })
    }
}

#[async_trait]
impl BackendPort for MockBackend {
    async fn health(&self) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(None)
    }

    async fn update_profile(&self, _user_id: Uuid, _patch: &ProfilePatch) -> AppResult<Profile> {
        Err(AppError::NotFound)
    }

    async fn fetch_streak(&self, _user_id: Uuid) -> AppResult<Option<Streak>> {
        Ok(None)
    }

    async fn count_entries(&self, _user_id: Uuid) -> AppResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entry_count.load(Ordering::SeqCst) as u64)
    }

    async fn fetch_random_entry(&self, _user_id: Uuid) -> AppResult<Option<GratitudeEntry>> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        self.random_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Some(entry_for(self.user_id))))
    }

    async fn register_push_token(&self, _user_id: Uuid, _token: &str) -> AppResult<()> {
        Ok(())
    }
}

struct MockAuth {
    user: Option<Uuid>,
    events: broadcast::Sender<AuthEvent>,
}

impl MockAuth {
    fn new(user: Option<Uuid>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self { user, events })
    }
}

impl AuthPort for MockAuth {
    fn current_user(&self) -> Option<Uuid> {
        self.user
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

struct MockClock {
    now_ms: AtomicI64,
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }
}

#[derive(Default)]
struct MockStateRepo {
    saved: Mutex<Option<PersistedThrowbackState>>,
}

#[async_trait]
impl ThrowbackStateRepositoryPort for MockStateRepo {
    async fn load(&self) -> AppResult<Option<PersistedThrowbackState>> {
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save(&self, state: &PersistedThrowbackState) -> AppResult<()> {
        *self.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}

struct Fixture {
    backend: Arc<MockBackend>,
    clock: Arc<MockClock>,
    repo: Arc<MockStateRepo>,
    store: ThrowbackStore,
}

fn fixture(entry_count: u64) -> Fixture {
    let user = Uuid::new_v4();
    let backend = MockBackend::new(user, entry_count);
    let auth = MockAuth::new(Some(user));
    let clock = Arc::new(MockClock {
        now_ms: AtomicI64::new(NOW_MS),
    });
    let repo = Arc::new(MockStateRepo::default());

    let store = ThrowbackStore::new(ThrowbackStoreDeps {
        backend: backend.clone(),
        auth,
        clock: clock.clone(),
        state_repo: repo.clone(),
    });

    Fixture {
        backend,
        clock,
        repo,
        store,
    }
}

#[tokio::test]
async fn weekly_below_entry_threshold_never_fetches() {
    let fx = fixture(6);

    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 0);
    let state = fx.store.snapshot();
    assert!(state.entry.is_none());
    assert!(!state.visible);
    assert!(state.last_shown_at_ms.is_none());
}

#[tokio::test]
async fn weekly_at_threshold_fetches_and_stamps() {
    let fx = fixture(7);

    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 1);
    let state = fx.store.snapshot();
    assert!(state.visible);
    assert!(state.entry.is_some());
    assert_eq!(state.last_shown_at_ms, Some(NOW_MS));

    // Only the stamp is persisted.
    let persisted = fx.repo.saved.lock().unwrap().clone().unwrap();
    assert_eq!(persisted.last_shown_at_ms, Some(NOW_MS));
}

#[tokio::test]
async fn second_check_within_window_is_gated() {
    let fx = fixture(7);

    fx.store.check(true, ThrowbackFrequency::Weekly).await;
    fx.clock.now_ms.store(NOW_MS + 2 * DAY_MS, Ordering::SeqCst);
    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn check_after_window_elapsed_fetches_again() {
    let fx = fixture(7);

    fx.store.check(true, ThrowbackFrequency::Weekly).await;
    fx.clock.now_ms.store(NOW_MS + 7 * DAY_MS, Ordering::SeqCst);
    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 2);
    let state = fx.store.snapshot();
    assert_eq!(state.last_shown_at_ms, Some(NOW_MS + 7 * DAY_MS));
}

#[tokio::test]
async fn disabled_skips_without_touching_the_backend() {
    let fx = fixture(100);

    fx.store.check(false, ThrowbackFrequency::Daily).await;

    assert_eq!(fx.backend.count_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hydrated_stamp_gates_a_fresh_session() {
    let fx = fixture(7);
    *fx.repo.saved.lock().unwrap() =
        Some(PersistedThrowbackState::current(Some(NOW_MS - DAY_MS)));

    fx.store.hydrate().await;
    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    assert_eq!(fx.backend.random_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_entry_clears_visibility_and_sets_error() {
    let fx = fixture(7);
    *fx.backend.random_result.lock().unwrap() = Some(Err(AppError::validation(
        "statements",
        "statements must not be empty",
    )));

    fx.store.check(true, ThrowbackFrequency::Weekly).await;

    let state = fx.store.snapshot();
    assert!(!state.visible);
    assert!(state.entry.is_none());
    assert!(state.error.as_deref().unwrap().contains("statements"));
    // No stamp for a failed show.
    assert!(state.last_shown_at_ms.is_none());
}

#[tokio::test]
async fn dismiss_hides_the_entry_but_keeps_the_stamp() {
    let fx = fixture(7);

    fx.store.check(true, ThrowbackFrequency::Weekly).await;
    fx.store.dismiss();

    let state = fx.store.snapshot();
    assert!(!state.visible);
    assert!(state.entry.is_none());
    assert_eq!(state.last_shown_at_ms, Some(NOW_MS));
}
