// Worker lifecycle state and outcome counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Worker lifecycle: Created -> Running -> Stopping -> Stopped
///
/// `Stopped` is terminal. A stopped worker is never restarted; start a new
/// one on the same queue instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Created => "CREATED",
            WorkerState::Running => "RUNNING",
            WorkerState::Stopping => "STOPPING",
            WorkerState::Stopped => "STOPPED",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-outcome counters, one increment per log record the worker emits
#[derive(Debug, Default)]
pub struct WorkerStats {
    sent: AtomicU64,
    failed: AtomicU64,
    internal_errors: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    pub sent: u64,
    pub failed: u64,
    pub internal_errors: u64,
}

impl WorkerStats {
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_internal_error(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
        }
    }
}
