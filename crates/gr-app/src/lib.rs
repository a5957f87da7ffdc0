//! # gr-app
//!
//! Application layer for Gratia: the staged startup coordinator, the
//! profile and throwback stores, background mutation sync, and the
//! debounced input coordinator. Everything here talks to the outside
//! world exclusively through the ports defined in `gr-core`.

pub mod deps;
pub mod input;
pub mod notify;
pub mod startup;
pub mod stores;
pub mod sync;

pub use deps::AppDeps;
pub use input::SafeInput;
pub use notify::{RegisterPushToken, RegisterPushTokenError};
pub use startup::{ServiceManager, ServiceManagerDeps, StartupError};
pub use stores::profile::{ProfileState, ProfileStore, ProfileStoreDeps};
pub use stores::throwback::{ThrowbackState, ThrowbackStore, ThrowbackStoreDeps};
pub use sync::{BackgroundSync, ReplayReport};
