//! Observed health of a supervised resource.
//!
//! # States
//! - Unknown: no tick has completed yet
//! - Healthy: the last probe passed
//! - Unhealthy: the last probe failed, crashed or timed out
//!
//! # Design Decisions
//! - Written only by the health loop, read by the `/health` endpoint
//! - Plain atomics; a reader may see counters from adjacent ticks

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// Counters and last outcome, shared between the loop and readers.
#[derive(Debug)]
pub struct HealthStatus {
    state: AtomicU8,
    ticks: AtomicU64,
    consecutive_failures: AtomicU64,
    recoveries: AtomicU64,
    failed_recoveries: AtomicU64,
}

/// A point-in-time copy of [`HealthStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub state: HealthState,
    pub ticks: u64,
    pub consecutive_failures: u64,
    pub recoveries: u64,
    pub failed_recoveries: u64,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(HealthState::Unknown as u8),
            ticks: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            recoveries: AtomicU64::new(0),
            failed_recoveries: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Acquire))
    }

    /// Record a passing probe.
    pub fn mark_success(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.transition(HealthState::Healthy);
    }

    /// Record a failed, crashed or timed-out probe.
    pub fn mark_failure(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        self.transition(HealthState::Unhealthy);
    }

    /// Record a recovery that repaired the resource.
    pub fn mark_recovery(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a recovery that failed or panicked.
    pub fn mark_recovery_failed(&self) {
        self.failed_recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            state: self.state(),
            ticks: self.ticks.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            failed_recoveries: self.failed_recoveries.load(Ordering::Relaxed),
        }
    }

    fn transition(&self, next: HealthState) {
        let prev = HealthState::from(self.state.swap(next as u8, Ordering::AcqRel));
        if prev != next && prev != HealthState::Unknown {
            tracing::info!(from = ?prev, to = ?next, "Health state changed");
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unknown() {
        let status = HealthStatus::new();
        assert_eq!(status.state(), HealthState::Unknown);
        assert_eq!(status.snapshot().ticks, 0);
    }

    #[test]
    fn test_failures_reset_on_success() {
        let status = HealthStatus::new();
        status.mark_failure();
        status.mark_recovery_failed();
        status.mark_failure();
        status.mark_recovery();
        assert_eq!(status.state(), HealthState::Unhealthy);
        assert_eq!(status.snapshot().consecutive_failures, 2);

        status.mark_success();
        let snap = status.snapshot();
        assert_eq!(snap.state, HealthState::Healthy);
        assert_eq!(snap.consecutive_failures, 0);
        assert_eq!(snap.ticks, 3);
        assert_eq!(snap.recoveries, 1);
        assert_eq!(snap.failed_recoveries, 1);
    }
}
