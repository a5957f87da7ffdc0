//! Configuration loading
//!
//! A TOML file plus environment overrides (`GRATIA_*`). Environment
//! variables win so deployments can override a checked-in file without
//! editing it.

use std::path::Path;

use anyhow::{Context, Result};
use gr_core::config::{AppConfig, BackendConfig, StartupConfig};

pub const BACKEND_URL_VAR: &str = "GRATIA_BACKEND_URL";
pub const API_KEY_VAR: &str = "GRATIA_API_KEY";
pub const PROJECT_ID_VAR: &str = "GRATIA_PROJECT_ID";
pub const DEV_MODE_VAR: &str = "GRATIA_DEV_MODE";

/// Load configuration from an optional TOML file, then apply
/// environment overrides. A missing file with a complete environment is
/// fine; missing backend settings are an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    // Pick up a local .env if present; ignore when absent.
    let _ = dotenvy::dotenv();

    let mut config = match path {
        Some(path) if path.exists() => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read config file failed: {}", path.display()))?;
            toml::from_str::<AppConfig>(&raw)
                .with_context(|| format!("parse config file failed: {}", path.display()))?
        }
        _ => AppConfig {
            backend: BackendConfig {
                url: String::new(),
                api_key: String::new(),
                project_id: String::new(),
            },
            startup: StartupConfig::default(),
        },
    };

    if let Ok(url) = std::env::var(BACKEND_URL_VAR) {
        config.backend.url = url;
    }
    if let Ok(key) = std::env::var(API_KEY_VAR) {
        config.backend.api_key = key;
    }
    if let Ok(project) = std::env::var(PROJECT_ID_VAR) {
        config.backend.project_id = project;
    }
    if let Ok(dev) = std::env::var(DEV_MODE_VAR) {
        config.startup.dev_mode = matches!(dev.as_str(), "1" | "true" | "yes");
    }

    if config.backend.url.is_empty() {
        anyhow::bail!("backend url is not configured (set {BACKEND_URL_VAR} or the config file)");
    }
    if config.backend.api_key.is_empty() {
        anyhow::bail!("backend api key is not configured (set {API_KEY_VAR} or the config file)");
    }

    Ok(config)
}
