//! Process-wide monitoring
//!
//! Installed synchronously before the startup sequence runs (the
//! "critical" phase): a tracing subscriber driven by `RUST_LOG` and a
//! panic hook that records panics through tracing before the default
//! hook runs.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INSTALL: Once = Once::new();

/// Idempotent; later calls are no-ops so tests and embedders can call it
/// freely.
pub fn install() {
    INSTALL.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).try_init();

        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(%location, "panic: {info}");
            default_hook(info);
        }));
    });
}
