//! Configuration fan-out subsystem.
//!
//! # Data Flow
//! ```text
//! PUT /api/v2/config/{services}  { key, value }
//!     → orchestrator.rs (one dispatch per service, sequential or bounded-concurrent)
//!     → executor.rs (session as service → exists? → put)
//!     → ServiceOutcome per service
//!     → ResultSet { service → outcome }
//! ```
//!
//! # Design Decisions
//! - Update-only: a key missing for a service is reported, never created
//! - Failures are values; one service never affects another's outcome
//! - No retries; each attempt is terminal for that service

pub mod executor;
pub mod orchestrator;
pub mod types;

pub use executor::{Executor, RegistryExecutor};
pub use orchestrator::Orchestrator;
pub use types::{ConfigChangeRequest, ResultSet, ServiceName, ServiceOutcome, SetConfigResponse, SetError};
