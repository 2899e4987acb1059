//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → HealthTarget::probe (target.rs)
//!     → on failure: HealthTarget::recover
//!     → Update state.rs
//!
//! Database target (database.rs):
//!     probe   = ping the connection in the shared handle
//!     recover = open a new connection, swap it into the handle
//!
//! State (state.rs):
//!     Unknown → Healthy ←→ Unhealthy
//!     Read by the /health endpoint
//! ```
//!
//! # Design Decisions
//! - The loop knows only the {probe, recover} contract, not the resource type
//! - One loop supervises one resource under one health signal
//! - Probe and recovery are untrusted: their panics are contained per call

pub mod active;
pub mod database;
pub mod state;
pub mod target;

pub use active::{HealthMonitor, ProbeOutcome, RecoveryOutcome};
pub use database::DatabaseTarget;
pub use state::{HealthSnapshot, HealthState, HealthStatus};
pub use target::{from_fns, FnTarget, HealthTarget};
