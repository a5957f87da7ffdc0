//! Application configuration domain model

use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Only the configuration the application layer needs; how it is loaded
/// (file, environment) is the composition root's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend settings
    pub backend: BackendConfig,

    /// Startup behavior
    pub startup: StartupConfig,
}

/// Hosted backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (PostgREST-shaped API)
    pub url: String,

    /// Public API key sent with every request
    pub api_key: String,

    /// Project identifier used when acquiring push tokens
    pub project_id: String,
}

/// Startup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Tolerate storage/backend bring-up failures instead of aborting
    #[serde(default)]
    pub dev_mode: bool,

    /// Seconds between network health probes
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
}

fn default_health_interval_secs() -> u64 {
    30
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            health_interval_secs: default_health_interval_secs(),
        }
    }
}
