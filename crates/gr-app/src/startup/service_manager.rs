use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use gr_core::error::{AppError, AppResult};
use gr_core::ports::{BackendPort, ClockPort, KeyValueStorePort, NetworkMonitorPort};
use gr_core::startup::{ServiceKind, ServiceStatus, StartupPhase, StartupState};

use crate::sync::BackgroundSync;

/// Hard timeout for the local storage round-trip check.
pub const STORAGE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Key used for the set/get/remove probe round-trip.
pub const STORAGE_PROBE_KEY: &str = "__startup_probe";

/// Errors that can abort startup. Outside dev mode, a failed storage
/// probe or backend warm-up is fatal; everything in the enhancement phase
/// degrades gracefully instead.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("startup already ran for this process")]
    AlreadyStarted,
    #[error("local storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("backend client unavailable: {0}")]
    BackendUnavailable(String),
}

/// Dependency grouping for [`ServiceManager`] construction.
pub struct ServiceManagerDeps {
    pub backend: Arc<dyn BackendPort>,
    pub kv: Arc<dyn KeyValueStorePort>,
    pub network: Arc<dyn NetworkMonitorPort>,
    pub background_sync: Arc<BackgroundSync>,
    pub clock: Arc<dyn ClockPort>,
    pub dev_mode: bool,
}

/// Sequences backend/storage readiness so nothing touches local
/// persistent storage or the backend client before it is safe, while
/// keeping perceived startup latency low.
pub struct ServiceManager {
    backend: Arc<dyn BackendPort>,
    kv: Arc<dyn KeyValueStorePort>,
    network: Arc<dyn NetworkMonitorPort>,
    background_sync: Arc<BackgroundSync>,
    clock: Arc<dyn ClockPort>,
    dev_mode: bool,
    state: Arc<Mutex<StartupState>>,
    started: AtomicBool,
}

impl ServiceManager {
    pub fn new(deps: ServiceManagerDeps) -> Self {
        let ServiceManagerDeps {
            backend,
            kv,
            network,
            background_sync,
            clock,
            dev_mode,
        } = deps;

        Self {
            backend,
            kv,
            network,
            background_sync,
            clock,
            dev_mode,
            state: Arc::new(Mutex::new(StartupState::new())),
            started: AtomicBool::new(false),
        }
    }

    /// Current bring-up snapshot. The enhancement phase is observable
    /// only through this getter.
    pub fn snapshot(&self) -> StartupState {
        self.state.lock().expect("startup state lock poisoned").clone()
    }

    /// Run the bring-up sequence. Returns once the core phase settled;
    /// enhancement services continue in the background. Calling this a
    /// second time in the same process is an error.
    pub async fn run(&self) -> Result<(), StartupError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(StartupError::AlreadyStarted);
        }

        let span = info_span!("startup.run", dev_mode = self.dev_mode);
        self.run_phases().instrument(span).await
    }

    async fn run_phases(&self) -> Result<(), StartupError> {
        // Phase 1 — critical. Monitoring hooks are installed synchronously
        // by the composition root before run() is called; no I/O happens
        // here, the phase only exists in the diagnostics timeline.
        self.enter_phase(StartupPhase::Critical);
        debug!("critical phase complete");

        // Phase 2 — core. Storage probe and backend warm-up run
        // concurrently; both futures settle before either result is
        // inspected so one slow service does not hide the other's outcome.
        self.enter_phase(StartupPhase::Core);
        self.set_status(ServiceKind::StorageProbe, ServiceStatus::Initializing);
        self.set_status(ServiceKind::BackendClient, ServiceStatus::Initializing);

        let (storage_result, backend_result) =
            tokio::join!(self.probe_storage(), self.warm_backend());

        match storage_result {
            Ok(()) => self.set_status(ServiceKind::StorageProbe, ServiceStatus::Ready),
            Err(err) => {
                self.set_status(ServiceKind::StorageProbe, ServiceStatus::Error);
                if !self.dev_mode {
                    return Err(StartupError::StorageUnavailable(err.to_string()));
                }
                warn!(error = %err, "storage probe failed, continuing in dev mode");
            }
        }

        match backend_result {
            Ok(()) => self.set_status(ServiceKind::BackendClient, ServiceStatus::Ready),
            Err(err) => {
                self.set_status(ServiceKind::BackendClient, ServiceStatus::Error);
                if !self.dev_mode {
                    return Err(StartupError::BackendUnavailable(err.to_string()));
                }
                warn!(error = %err, "backend warm-up failed, continuing in dev mode");
            }
        }

        {
            let mut state = self.state.lock().expect("startup state lock poisoned");
            state.core_ready = true;
        }
        info!("core phase complete");

        // Phase 3 — enhancement. Fire-and-forget; every failure is caught
        // and logged inside its own task and the phase always completes.
        self.enter_phase(StartupPhase::Enhancement);
        self.spawn_enhancements();
        {
            let now = self.clock.now_ms();
            let mut state = self.state.lock().expect("startup state lock poisoned");
            state.finish(now);
        }
        info!("enhancement services spawned, startup complete");

        Ok(())
    }

    /// Write/read/delete round-trip against the key-value store under a
    /// hard timeout.
    async fn probe_storage(&self) -> AppResult<()> {
        let token = Uuid::new_v4().to_string();
        let round_trip = async {
            self.kv.set(STORAGE_PROBE_KEY, &token).await?;
            let read_back = self.kv.get(STORAGE_PROBE_KEY).await?;
            if read_back.as_deref() != Some(token.as_str()) {
                return Err(AppError::Unknown(
                    "storage probe read-back mismatch".into(),
                ));
            }
            self.kv.remove(STORAGE_PROBE_KEY).await
        };

        match tokio::time::timeout(STORAGE_PROBE_TIMEOUT, round_trip).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Unknown(format!(
                "storage probe timed out after {}ms",
                STORAGE_PROBE_TIMEOUT.as_millis()
            ))),
        }
    }

    async fn warm_backend(&self) -> AppResult<()> {
        self.backend.health().await
    }

    fn spawn_enhancements(&self) {
        // Network monitor
        {
            let state = Arc::clone(&self.state);
            let network = Arc::clone(&self.network);
            tokio::spawn(async move {
                set_status(&state, ServiceKind::NetworkMonitor, ServiceStatus::Initializing);
                match network.start().await {
                    Ok(()) => set_status(&state, ServiceKind::NetworkMonitor, ServiceStatus::Ready),
                    Err(err) => {
                        warn!(error = %err, "network monitor failed to start");
                        set_status(&state, ServiceKind::NetworkMonitor, ServiceStatus::Error);
                    }
                }
            });
        }

        // Background sync listener
        {
            let state = Arc::clone(&self.state);
            let sync = Arc::clone(&self.background_sync);
            tokio::spawn(async move {
                set_status(&state, ServiceKind::BackgroundSync, ServiceStatus::Initializing);
                match sync.start().await {
                    Ok(()) => set_status(&state, ServiceKind::BackgroundSync, ServiceStatus::Ready),
                    Err(err) => {
                        warn!(error = %err, "background sync failed to start");
                        set_status(&state, ServiceKind::BackgroundSync, ServiceStatus::Error);
                    }
                }
            });
        }

        // One-shot replay of mutations queued in previous sessions
        {
            let state = Arc::clone(&self.state);
            let sync = Arc::clone(&self.background_sync);
            tokio::spawn(async move {
                set_status(&state, ServiceKind::MutationReplay, ServiceStatus::Initializing);
                match sync.replay().await {
                    Ok(report) => {
                        debug!(applied = report.applied, dropped = report.dropped, requeued = report.requeued, "queued mutation replay finished");
                        set_status(&state, ServiceKind::MutationReplay, ServiceStatus::Ready);
                    }
                    Err(err) => {
                        warn!(error = %err, "queued mutation replay failed");
                        set_status(&state, ServiceKind::MutationReplay, ServiceStatus::Error);
                    }
                }
            });
        }
    }

    fn enter_phase(&self, phase: StartupPhase) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock().expect("startup state lock poisoned");
        state.enter_phase(phase, now);
    }

    fn set_status(&self, kind: ServiceKind, status: ServiceStatus) {
        set_status(&self.state, kind, status);
    }
}

fn set_status(state: &Arc<Mutex<StartupState>>, kind: ServiceKind, status: ServiceStatus) {
    state
        .lock()
        .expect("startup state lock poisoned")
        .set_status(kind, status);
}
