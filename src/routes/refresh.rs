//! Refresh loop status HTTP endpoint.
//!
//! GET /api/v1/refresh/status: tick counters, timestamps and the latest
//! upstream probe report of the background refresh loop.

use axum::extract::State;
use axum::Json;

use crate::services::refresh::{RefreshStatus, SharedDashboard};

#[utoipa::path(
    get,
    path = "/api/v1/refresh/status",
    tag = "Refresh",
    responses(
        (status = 200, description = "Current refresh loop status", body = RefreshStatus),
    )
)]
pub async fn get_refresh_status(State(store): State<SharedDashboard>) -> Json<RefreshStatus> {
    let s = store.read().await;
    Json(s.status.clone())
}
