//! # gratia
//!
//! Composition root for the Gratia client core. Loads configuration,
//! installs process-wide monitoring, wires infrastructure adapters into
//! the application layer, and drives the staged startup sequence.

pub mod bootstrap;
pub mod config;
pub mod monitoring;

pub use bootstrap::Gratia;
pub use config::load_config;
