//! Persisted store state
//!
//! On-disk shape of the two client stores, tagged with a schema version.
//! Raw-value migrations run before these types are deserialized, so the
//! typed shapes only ever describe the current version.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::Profile;
use crate::streak::Streak;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Persisted slice of the profile store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedProfileState {
    #[serde(default)]
    pub schema_version: u32,
    pub profile: Option<Profile>,
    pub streak: Option<Streak>,
    pub loaded_for: Option<Uuid>,
}

impl PersistedProfileState {
    pub fn current(profile: Option<Profile>, streak: Option<Streak>, loaded_for: Option<Uuid>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            profile,
            streak,
            loaded_for,
        }
    }
}

/// Persisted slice of the throwback store. Only the cool-down stamp
/// survives restarts; the fetched entry and visibility are session-local.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedThrowbackState {
    #[serde(default)]
    pub schema_version: u32,
    pub last_shown_at_ms: Option<i64>,
}

impl PersistedThrowbackState {
    pub fn current(last_shown_at_ms: Option<i64>) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            last_shown_at_ms,
        }
    }
}
