//! Public HTTP API.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use self::auth::api_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Version segment of every route.
pub const API_VERSION: &str = "v2";

/// All API routes.
///
/// `request_timeout` applies to the read-only routes. The config route is
/// bounded by the orchestrator deadline so it always reports per-service
/// outcomes.
#[allow(deprecated)]
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let open = Router::new()
        .route("/api/v2/ping", get(ping))
        .route("/api/v2/version", get(version))
        .layer(TimeoutLayer::new(request_timeout));

    let protected = Router::new()
        .route("/api/v2/config/{services}", put(set_config))
        .layer(middleware::from_fn_with_state(state.clone(), api_auth_middleware));

    open.merge(protected).with_state(state)
}
