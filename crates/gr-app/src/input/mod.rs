//! Debounced input coordinator
//!
//! Debounces value propagation (default 300 ms) but suspends updates
//! entirely while a submission is in flight, and forces the debounced
//! value to the latest raw value at submission start so a stale,
//! about-to-resolve debounce callback cannot land after submission logic
//! has captured the input.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
struct Inner {
    value: String,
    debounced: String,
    /// Bumped on every schedule and on submission start; a debounce task
    /// whose generation is stale does nothing.
    generation: u64,
    submitting: bool,
}

#[derive(Clone)]
pub struct SafeInput {
    inner: Arc<Mutex<Inner>>,
    delay: Duration,
}

impl SafeInput {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            delay,
        }
    }

    pub fn value(&self) -> String {
        self.lock().value.clone()
    }

    pub fn debounced_value(&self) -> String {
        self.lock().debounced.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Record a raw input change and schedule debounced propagation.
    /// Ignored entirely while a submission is in flight.
    pub fn handle_input_change(&self, raw: impl Into<String>) {
        let generation = {
            let mut inner = self.lock();
            if inner.submitting {
                return;
            }
            inner.value = raw.into();
            inner.generation += 1;
            inner.generation
        };

        let shared = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = shared.lock().expect("input state lock poisoned");
            if inner.generation == generation && !inner.submitting {
                inner.debounced = inner.value.clone();
            }
        });
    }

    /// Lock the coordinator for submission: the debounced value snaps to
    /// the latest raw value and any pending debounce task is invalidated.
    pub fn start_submission(&self) {
        let mut inner = self.lock();
        inner.submitting = true;
        inner.generation += 1;
        inner.debounced = inner.value.clone();
    }

    pub fn end_submission(&self) {
        self.lock().submitting = false;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("input state lock poisoned")
    }
}

impl Default for SafeInput {
    fn default() -> Self {
        Self::new()
    }
}
