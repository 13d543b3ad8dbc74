use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::refresh::SharedDashboard;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" once a snapshot is published, "loading" before that
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the first full refresh has completed
    pub snapshot_ready: bool,
    /// Whether the background refresh loop is running
    pub refresh_active: bool,
}

/// Health check endpoint.
///
/// Always 200 so load balancers see the process as up while the first
/// full refresh is still probing upstream.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(store): State<SharedDashboard>) -> Json<HealthResponse> {
    let s = store.read().await;
    let ready = s.dashboard.is_some();

    Json(HealthResponse {
        status: if ready { "ok" } else { "loading" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        snapshot_ready: ready,
        refresh_active: s.status.active,
    })
}
