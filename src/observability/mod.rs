//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured log events with field-level context
//! - Request ID attached by the HTTP layer, not here
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
