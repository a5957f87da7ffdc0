//! Client-side stores
//!
//! Single source of truth for per-user state. Store actions never throw
//! to their callers; failures land in the store's `error` fields and the
//! UI observes them reactively.

pub mod profile;
pub mod throwback;
