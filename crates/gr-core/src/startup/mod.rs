//! Startup phase state
//!
//! Process-wide bring-up bookkeeping: which phase the app is in, the
//! status of each named service, and per-phase timestamps for duration
//! diagnostics. Never persisted; reset only by process restart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPhase {
    Critical,
    Core,
    Enhancement,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Pending,
    Initializing,
    Ready,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    StorageProbe,
    BackendClient,
    BackgroundSync,
    NetworkMonitor,
    MutationReplay,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::StorageProbe,
        ServiceKind::BackendClient,
        ServiceKind::BackgroundSync,
        ServiceKind::NetworkMonitor,
        ServiceKind::MutationReplay,
    ];
}

/// Snapshot of the bring-up sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupState {
    pub phase: StartupPhase,
    pub core_ready: bool,
    statuses: HashMap<ServiceKind, ServiceStatus>,
    phase_started_ms: HashMap<StartupPhase, i64>,
    phase_ended_ms: HashMap<StartupPhase, i64>,
}

impl StartupState {
    pub fn new() -> Self {
        Self {
            phase: StartupPhase::Critical,
            core_ready: false,
            statuses: ServiceKind::ALL
                .into_iter()
                .map(|kind| (kind, ServiceStatus::Pending))
                .collect(),
            phase_started_ms: HashMap::new(),
            phase_ended_ms: HashMap::new(),
        }
    }

    pub fn status(&self, kind: ServiceKind) -> ServiceStatus {
        self.statuses
            .get(&kind)
            .copied()
            .unwrap_or(ServiceStatus::Pending)
    }

    pub fn set_status(&mut self, kind: ServiceKind, status: ServiceStatus) {
        self.statuses.insert(kind, status);
    }

    pub fn enter_phase(&mut self, phase: StartupPhase, now_ms: i64) {
        if let Some(previous) = self.current_phase_if_open() {
            self.phase_ended_ms.insert(previous, now_ms);
        }
        self.phase = phase;
        self.phase_started_ms.insert(phase, now_ms);
    }

    pub fn finish(&mut self, now_ms: i64) {
        if let Some(previous) = self.current_phase_if_open() {
            self.phase_ended_ms.insert(previous, now_ms);
        }
        self.phase = StartupPhase::Complete;
    }

    fn current_phase_if_open(&self) -> Option<StartupPhase> {
        if self.phase_started_ms.contains_key(&self.phase)
            && !self.phase_ended_ms.contains_key(&self.phase)
        {
            Some(self.phase)
        } else {
            None
        }
    }

    /// Duration of a completed phase, for diagnostics.
    pub fn phase_duration_ms(&self, phase: StartupPhase) -> Option<i64> {
        let started = self.phase_started_ms.get(&phase)?;
        let ended = self.phase_ended_ms.get(&phase)?;
        Some(ended - started)
    }
}

impl Default for StartupState {
    fn default() -> Self {
        Self::new()
    }
}
