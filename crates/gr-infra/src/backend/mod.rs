//! Hosted backend adapter
//!
//! Thin wrappers over a PostgREST-shaped HTTP API. The client handles
//! transport and status translation; `rows` holds the raw wire shapes and
//! their fallible conversions into domain types; the adapter implements
//! [`gr_core::ports::BackendPort`] on top of both.

mod adapter;
mod client;
mod rows;

pub use adapter::BackendAdapter;
pub use client::SupabaseClient;
pub use rows::{EntryRow, ProfileRow, StreakRow};
