//! Route handlers for ping, version, and configuration changes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;

use crate::api::API_VERSION;
use crate::fanout::{ConfigChangeRequest, ServiceName, SetConfigResponse};
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub api_version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub api_version: &'static str,
    pub version: &'static str,
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        api_version: API_VERSION,
        status: "pong",
    })
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        api_version: API_VERSION,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Split the `{services}` path segment: comma separated, blanks dropped.
pub fn parse_services(raw: &str) -> Vec<ServiceName> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `PUT /api/v2/config/{services}`: apply one change to every listed service.
pub async fn set_config(
    State(state): State<AppState>,
    Path(services): Path<String>,
    body: Result<Json<ConfigChangeRequest>, JsonRejection>,
) -> Result<Json<SetConfigResponse>, ApiError> {
    let Json(request) = body?;
    let services = parse_services(&services);

    let result = state.orchestrator().set(&services, &request).await;

    let failed = result.values().filter(|o| !o.success).count();
    tracing::info!(
        key = %request.key,
        services = result.len(),
        failed,
        "Configuration change applied"
    );

    Ok(Json(SetConfigResponse::from(result)))
}
