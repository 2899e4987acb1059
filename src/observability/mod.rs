//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`check`, `error`, `request_id`) over formatted text
//! - Request ID flows from the HTTP layer into handler logs
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
