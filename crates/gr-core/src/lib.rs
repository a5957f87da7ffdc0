//! # gr-core
//!
//! Core domain models and business logic for Gratia.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod auth;
pub mod config;
pub mod error;
pub mod journal;
pub mod ports;
pub mod profile;
pub mod startup;
pub mod state;
pub mod streak;
pub mod sync;
pub mod throwback;

// Re-export commonly used types at the crate root
pub use auth::AuthEvent;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use journal::{GratitudeEntry, Statements};
pub use profile::{DailyGoal, Profile, ProfilePatch, ReminderTime};
pub use startup::{ServiceKind, ServiceStatus, StartupPhase, StartupState};
pub use streak::Streak;
pub use sync::QueuedMutation;
pub use throwback::{ThrowbackDecision, ThrowbackFrequency, ThrowbackSkipReason};
