//! Application assembly
//!
//! Builds the infra adapters from configuration, groups them into
//! [`AppDeps`], constructs the stores and the startup coordinator, and
//! exposes the handful of objects a host UI needs to hold on to.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use gr_app::{
    AppDeps, BackgroundSync, ProfileStore, ProfileStoreDeps, RegisterPushToken, ServiceManager,
    ServiceManagerDeps, ThrowbackStore, ThrowbackStoreDeps,
};
use gr_core::config::AppConfig;
use gr_core::ports::{
    AuthPort, BackendPort, ClockPort, KeyValueStorePort, MutationQueuePort, NetworkMonitorPort,
    NotificationPort, ProfileStateRepositoryPort, ThrowbackStateRepositoryPort,
};
use gr_infra::{
    AuthSession, BackendAdapter, FileKeyValueStore, HttpNetworkMonitor, KvMutationQueue,
    KvProfileStateRepository, KvThrowbackStateRepository, ReminderBridge, SupabaseClient,
    SystemClock,
};

pub const STORAGE_FILE: &str = "gratia-store.json";

/// The assembled application.
pub struct Gratia {
    pub config: AppConfig,
    pub auth: Arc<AuthSession>,
    pub service_manager: Arc<ServiceManager>,
    pub profile_store: Arc<ProfileStore>,
    pub throwback_store: Arc<ThrowbackStore>,
    pub register_push_token: Arc<RegisterPushToken>,
    /// Present when assembled over the hosted backend; absent when the
    /// host wired its own ports through [`Gratia::from_deps`].
    client: Option<Arc<SupabaseClient>>,
}

impl Gratia {
    /// Assemble the app with the default data directory.
    pub fn assemble(config: AppConfig) -> Result<Self> {
        let data_dir = dirs::data_dir()
            .context("platform data directory unavailable")?
            .join("gratia");
        Self::assemble_in(config, data_dir)
    }

    /// Assemble the app storing local state under `data_dir`.
    pub fn assemble_in(config: AppConfig, data_dir: PathBuf) -> Result<Self> {
        let client = Arc::new(SupabaseClient::new(
            &config.backend.url,
            &config.backend.api_key,
        )?);
        let backend: Arc<dyn BackendPort> = Arc::new(BackendAdapter::new(Arc::clone(&client)));

        let kv: Arc<dyn KeyValueStorePort> =
            Arc::new(FileKeyValueStore::new(data_dir.join(STORAGE_FILE)));
        let profile_state_repo: Arc<dyn ProfileStateRepositoryPort> =
            Arc::new(KvProfileStateRepository::new(Arc::clone(&kv)));
        let throwback_state_repo: Arc<dyn ThrowbackStateRepositoryPort> =
            Arc::new(KvThrowbackStateRepository::new(Arc::clone(&kv)));

        let auth = Arc::new(AuthSession::new());
        let auth_port: Arc<dyn AuthPort> = Arc::clone(&auth) as Arc<dyn AuthPort>;

        let notifications: Arc<dyn NotificationPort> =
            Arc::new(ReminderBridge::new(Arc::clone(&kv)));
        let network: Arc<dyn NetworkMonitorPort> = Arc::new(HttpNetworkMonitor::new(
            Arc::clone(&client),
            Duration::from_secs(config.startup.health_interval_secs),
        ));
        let mutation_queue: Arc<dyn MutationQueuePort> =
            Arc::new(KvMutationQueue::new(Arc::clone(&kv)));
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

        let deps = AppDeps {
            backend,
            kv,
            profile_state_repo,
            throwback_state_repo,
            auth: auth_port,
            notifications,
            network,
            mutation_queue,
            clock,
        };

        let mut app = Self::from_deps(config, auth, deps);
        app.client = Some(client);
        Ok(app)
    }

    /// Wire stores and the startup coordinator from pre-built ports.
    pub fn from_deps(config: AppConfig, auth: Arc<AuthSession>, deps: AppDeps) -> Self {
        let background_sync = Arc::new(BackgroundSync::new(
            Arc::clone(&deps.backend),
            Arc::clone(&deps.mutation_queue),
            Arc::clone(&deps.network),
        ));

        let service_manager = Arc::new(ServiceManager::new(ServiceManagerDeps {
            backend: Arc::clone(&deps.backend),
            kv: Arc::clone(&deps.kv),
            network: Arc::clone(&deps.network),
            background_sync,
            clock: Arc::clone(&deps.clock),
            dev_mode: config.startup.dev_mode,
        }));

        let profile_store = Arc::new(ProfileStore::new(ProfileStoreDeps {
            backend: Arc::clone(&deps.backend),
            auth: Arc::clone(&deps.auth),
            notifications: Arc::clone(&deps.notifications),
            network: Arc::clone(&deps.network),
            mutation_queue: Arc::clone(&deps.mutation_queue),
            state_repo: Arc::clone(&deps.profile_state_repo),
        }));

        let throwback_store = Arc::new(ThrowbackStore::new(ThrowbackStoreDeps {
            backend: Arc::clone(&deps.backend),
            auth: Arc::clone(&deps.auth),
            clock: Arc::clone(&deps.clock),
            state_repo: Arc::clone(&deps.throwback_state_repo),
        }));

        let register_push_token = Arc::new(RegisterPushToken::new(
            Arc::clone(&deps.notifications),
            Arc::clone(&deps.backend),
        ));

        Self {
            config,
            auth,
            service_manager,
            profile_store,
            throwback_store,
            register_push_token,
            client: None,
        }
    }

    /// Record a signed-in identity. The backend client carries the
    /// session's access token from here on; the stores react through the
    /// auth event stream.
    pub fn sign_in(&self, user_id: uuid::Uuid, access_token: Option<String>) {
        if let Some(client) = &self.client {
            client.set_access_token(access_token);
        }
        self.auth.sign_in(user_id);
    }

    /// Clear the signed-in identity and drop the session token.
    pub fn sign_out(&self) {
        if let Some(client) = &self.client {
            client.set_access_token(None);
        }
        self.auth.sign_out();
    }

    /// Install monitoring, hydrate persisted state, attach the auth
    /// listener, and run the staged bring-up.
    pub async fn start(&self) -> Result<()> {
        crate::monitoring::install();

        self.profile_store.hydrate().await;
        self.throwback_store.hydrate().await;
        self.profile_store.attach_auth_listener();

        self.service_manager
            .run()
            .await
            .context("startup sequence failed")?;
        Ok(())
    }
}
