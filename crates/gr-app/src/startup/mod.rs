//! Startup coordinator
//!
//! Three-phase bring-up: a synchronous critical phase (process-wide
//! monitoring is installed by the composition root before `run`), a
//! parallel core phase (storage probe + backend warm-up, joined with
//! "settle all, inspect individually"), and a fire-and-forget enhancement
//! phase for best-effort background services.

mod service_manager;

pub use service_manager::{ServiceManager, ServiceManagerDeps, StartupError};
pub use service_manager::{STORAGE_PROBE_KEY, STORAGE_PROBE_TIMEOUT};
