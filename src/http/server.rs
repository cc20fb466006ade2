//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Bound fan-out by the request timeout through the orchestrator deadline
//! - Bind server to listener
//! - Apply configuration reloads to the live state
//! - Stop on the shutdown signal

use arc_swap::ArcSwap;
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::config::ServiceConfig;
use crate::fanout::{Orchestrator, RegistryExecutor};
use crate::http::request::{make_span, track_metrics, UuidRequestId, X_REQUEST_ID};
use crate::registry::{DefaultClientFactory, RegistryClientFactory};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration, swapped on reload.
    pub config: Arc<ArcSwap<ServiceConfig>>,
    /// Source of per-service registry sessions.
    pub factory: Arc<dyn RegistryClientFactory>,
}

impl AppState {
    pub fn new(config: ServiceConfig, factory: Arc<dyn RegistryClientFactory>) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            factory,
        }
    }

    /// Orchestrator built from the current configuration snapshot.
    ///
    /// Without an explicit fan-out deadline the request timeout bounds the
    /// fan-out, so a slow registry yields cancelled entries instead of an
    /// empty timeout response.
    pub fn orchestrator(&self) -> Orchestrator {
        let config = self.config.load();
        let executor = RegistryExecutor::new(self.factory.clone(), config.registry.clone());
        let deadline_secs = config
            .fanout
            .deadline_secs
            .unwrap_or(config.timeouts.request_secs);
        Orchestrator::from_config(Arc::new(executor), &config.fanout)
            .with_deadline(Duration::from_secs(deadline_secs))
    }

    /// Replace the live configuration.
    pub fn apply_config(&self, config: ServiceConfig) {
        tracing::info!(
            registry = %config.registry.url(),
            mode = ?config.fanout.mode,
            "Configuration reloaded"
        );
        self.config.store(Arc::new(config));
    }
}

/// HTTP server for the fan-out API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server talking to the configured registry.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_factory(config, Arc::new(DefaultClientFactory))
    }

    /// Create a server with a custom registry client factory.
    pub fn with_factory(config: ServiceConfig, factory: Arc<dyn RegistryClientFactory>) -> Self {
        let state = AppState::new(config, factory);
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: &AppState) -> Router {
        let config = state.config.load();
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);

        api::router(state.clone(), request_timeout)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the live one.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared state, e.g. for applying configuration out of band.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
