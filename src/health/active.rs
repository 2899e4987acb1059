//! Active health checking.
//!
//! # Responsibilities
//! - Probe the supervised target on a fixed interval
//! - Run the recovery action when a probe fails, crashes or times out
//! - Exit promptly on cancellation
//!
//! # Tick protocol
//! ```text
//! wait interval (or cancellation)
//!     → probe on blocking pool
//!         true            → log healthy, done
//!         false           → log unhealthy ─┐
//!         panic / timeout → log error ─────┴→ recover on blocking pool → done
//! ```
//!
//! # Design Decisions
//! - First tick fires one full interval after start, never at t=0
//! - Ticks never overlap: the next wait starts after recovery returns
//! - Probe and recovery panics are contained; the loop only ends on cancellation
//! - A timed-out probe is abandoned, not interrupted

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::HealthCheckConfig;
use crate::health::state::HealthStatus;
use crate::health::target::HealthTarget;
use crate::observability::metrics;

/// Result of one probe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy,
    Crashed,
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_healthy(self) -> bool {
        self == ProbeOutcome::Healthy
    }

    fn label(self) -> &'static str {
        match self {
            ProbeOutcome::Healthy => "healthy",
            ProbeOutcome::Unhealthy => "unhealthy",
            ProbeOutcome::Crashed => "crashed",
            ProbeOutcome::TimedOut => "timeout",
        }
    }
}

/// Result of one recovery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Recovered,
    Failed,
    Crashed,
}

impl RecoveryOutcome {
    fn label(self) -> &'static str {
        match self {
            RecoveryOutcome::Recovered => "ok",
            RecoveryOutcome::Failed => "failed",
            RecoveryOutcome::Crashed => "crashed",
        }
    }
}

/// Periodic supervisor for one [`HealthTarget`].
pub struct HealthMonitor<T: HealthTarget> {
    name: String,
    interval: Duration,
    probe_timeout: Option<Duration>,
    target: Arc<T>,
    status: Arc<HealthStatus>,
}

impl<T: HealthTarget> HealthMonitor<T> {
    pub fn new(name: impl Into<String>, interval: Duration, target: T) -> Self {
        Self {
            name: name.into(),
            interval,
            probe_timeout: None,
            target: Arc::new(target),
            status: Arc::new(HealthStatus::new()),
        }
    }

    pub fn from_config(config: &HealthCheckConfig, target: T) -> Self {
        Self::new(config.name.clone(), config.interval(), target)
            .with_probe_timeout(config.probe_timeout())
    }

    /// Treat a probe running longer than `timeout` as failed.
    pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Report into an existing status instead of a private one.
    pub fn with_status(mut self, status: Arc<HealthStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> Arc<HealthStatus> {
        self.status.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the loop as a background task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            check = %self.name,
            interval = ?self.interval,
            probe_timeout = ?self.probe_timeout,
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Cancellation first so a due tick cannot mask it.
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(check = %self.name, "Ending session...");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(&cancel).await;
                }
            }
        }
    }

    /// One probe plus, on failure, one recovery.
    pub async fn tick(&self, cancel: &CancellationToken) -> ProbeOutcome {
        let outcome = self.probe().await;
        metrics::record_health_tick(&self.name, outcome.label());
        metrics::record_health_status(&self.name, outcome.is_healthy());

        if outcome.is_healthy() {
            self.status.mark_success();
            tracing::info!(check = %self.name, "System is ok");
            return outcome;
        }

        self.status.mark_failure();
        tracing::warn!(
            check = %self.name,
            outcome = outcome.label(),
            "Unhealthy state detected, running recovery"
        );
        self.recover(cancel).await;
        outcome
    }

    async fn probe(&self) -> ProbeOutcome {
        let target = self.target.clone();
        let handle = tokio::task::spawn_blocking(move || target.probe());

        let joined = match self.probe_timeout {
            Some(limit) => match time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::error!(check = %self.name, timeout = ?limit, "Probe timed out");
                    return ProbeOutcome::TimedOut;
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(true) => ProbeOutcome::Healthy,
            Ok(false) => ProbeOutcome::Unhealthy,
            Err(e) => {
                tracing::error!(
                    check = %self.name,
                    panic = %join_error_message(e),
                    "panic in probe"
                );
                ProbeOutcome::Crashed
            }
        }
    }

    async fn recover(&self, cancel: &CancellationToken) -> RecoveryOutcome {
        let target = self.target.clone();
        let cancel = cancel.clone();
        let outcome = match tokio::task::spawn_blocking(move || target.recover(&cancel)).await {
            Ok(true) => RecoveryOutcome::Recovered,
            Ok(false) => {
                tracing::warn!(check = %self.name, "Recovery did not repair the target");
                RecoveryOutcome::Failed
            }
            Err(e) => {
                tracing::error!(
                    check = %self.name,
                    panic = %join_error_message(e),
                    "panic in recovery"
                );
                RecoveryOutcome::Crashed
            }
        };

        match outcome {
            RecoveryOutcome::Recovered => self.status.mark_recovery(),
            RecoveryOutcome::Failed | RecoveryOutcome::Crashed => {
                self.status.mark_recovery_failed()
            }
        }
        metrics::record_recovery(&self.name, outcome.label());
        outcome
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    panic_message(err.into_panic().as_ref())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
