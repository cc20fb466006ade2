//! Remote configuration fan-out proxy library.

pub mod api;
pub mod config;
pub mod fanout;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::ServiceConfig;
pub use fanout::{ConfigChangeRequest, Orchestrator, ServiceOutcome};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
