//! Versioned store persistence
//!
//! The two client stores persist as versioned JSON blobs in the
//! key-value store. Raw values pass through the migration chain before
//! they are deserialized into the current typed shapes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use gr_core::error::{AppError, AppResult};
use gr_core::ports::{
    KeyValueStorePort, ProfileStateRepositoryPort, StateMigrationPort,
    ThrowbackStateRepositoryPort,
};
use gr_core::profile::ReminderTime;
use gr_core::state::{
    PersistedProfileState, PersistedThrowbackState, CURRENT_SCHEMA_VERSION,
};

pub const PROFILE_STATE_KEY: &str = "profile_store_state";
pub const THROWBACK_STATE_KEY: &str = "throwback_store_state";

/// Applies schema migrations to a raw persisted value until it reaches
/// the current version.
pub struct StateMigrator {
    migrations: Vec<Box<dyn StateMigrationPort>>,
}

impl StateMigrator {
    pub fn new(migrations: Vec<Box<dyn StateMigrationPort>>) -> Self {
        Self { migrations }
    }

    pub fn with_defaults() -> Self {
        Self::new(vec![Box::new(SanitizeReminderTime)])
    }

    pub fn migrate_to_latest(&self, mut raw: Value) -> AppResult<Value> {
        loop {
            let current = schema_version(&raw);
            if current >= CURRENT_SCHEMA_VERSION {
                return Ok(raw);
            }

            let migration = self
                .migrations
                .iter()
                .find(|m| m.from_version() == current)
                .ok_or_else(|| {
                    AppError::Unknown(format!("no migration from schema version {current}"))
                })?;

            raw = migration.migrate(raw);
            if schema_version(&raw) <= current {
                return Err(AppError::Unknown(format!(
                    "migration from version {current} did not advance the schema"
                )));
            }
        }
    }
}

fn schema_version(raw: &Value) -> u32 {
    raw.get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

/// v0 → v1: reminder times were persisted unvalidated; null out any
/// string that fails the strict `HH:MM:SS` check.
pub struct SanitizeReminderTime;

impl StateMigrationPort for SanitizeReminderTime {
    fn from_version(&self) -> u32 {
        0
    }

    fn migrate(&self, mut raw: Value) -> Value {
        let bad_time = raw
            .pointer("/profile/reminder_time")
            .and_then(Value::as_str)
            .is_some_and(|time| ReminderTime::parse(time).is_err());

        if bad_time {
            if let Some(slot) = raw.pointer_mut("/profile/reminder_time") {
                *slot = Value::Null;
            }
        }

        raw["schema_version"] = Value::from(1);
        raw
    }
}

fn decode_migrated<T: serde::de::DeserializeOwned>(
    migrator: &StateMigrator,
    raw: &str,
) -> AppResult<T> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| AppError::Unknown(format!("corrupt persisted state: {err}")))?;
    let migrated = migrator.migrate_to_latest(value)?;
    serde_json::from_value(migrated)
        .map_err(|err| AppError::validation_message(format!("persisted state shape: {err}")))
}

fn encode<T: serde::Serialize>(state: &T) -> AppResult<String> {
    serde_json::to_string(state)
        .map_err(|err| AppError::Unknown(format!("serialize persisted state failed: {err}")))
}

pub struct KvProfileStateRepository {
    kv: Arc<dyn KeyValueStorePort>,
    migrator: StateMigrator,
}

impl KvProfileStateRepository {
    pub fn new(kv: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            kv,
            migrator: StateMigrator::with_defaults(),
        }
    }
}

#[async_trait]
impl ProfileStateRepositoryPort for KvProfileStateRepository {
    async fn load(&self) -> AppResult<Option<PersistedProfileState>> {
        match self.kv.get(PROFILE_STATE_KEY).await? {
            Some(raw) => Ok(Some(decode_migrated(&self.migrator, &raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &PersistedProfileState) -> AppResult<()> {
        self.kv.set(PROFILE_STATE_KEY, &encode(state)?).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.kv.remove(PROFILE_STATE_KEY).await
    }
}

pub struct KvThrowbackStateRepository {
    kv: Arc<dyn KeyValueStorePort>,
    migrator: StateMigrator,
}

impl KvThrowbackStateRepository {
    pub fn new(kv: Arc<dyn KeyValueStorePort>) -> Self {
        Self {
            kv,
            migrator: StateMigrator::with_defaults(),
        }
    }
}

#[async_trait]
impl ThrowbackStateRepositoryPort for KvThrowbackStateRepository {
    async fn load(&self) -> AppResult<Option<PersistedThrowbackState>> {
        match self.kv.get(THROWBACK_STATE_KEY).await? {
            Some(raw) => Ok(Some(decode_migrated(&self.migrator, &raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &PersistedThrowbackState) -> AppResult<()> {
        self.kv.set(THROWBACK_STATE_KEY, &encode(state)?).await
    }
}
