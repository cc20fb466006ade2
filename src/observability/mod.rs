//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and fan-out produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counters, per-service outcome counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every request span
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
