//! Dashboard HTTP endpoints.
//!
//! - GET /api/v1/dashboard
//! - GET /api/v1/regions
//! - GET /api/v1/regions/:name
//! - GET /api/v1/trends/rainfall
//! - GET /api/v1/trends/water
//! - GET /api/v1/weather
//! - GET /api/v1/alerts

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{
    Alert, AlertSeverity, Dashboard, HourlyRainfallPoint, Region, RegionSnapshot, WeatherSummary,
    WeeklyWaterPoint,
};
use crate::routes::published;
use crate::services::refresh::SharedDashboard;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertsResponse {
    pub summary: AlertSummary,
    pub alerts: Vec<Alert>,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let high = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::High)
            .count();
        Self {
            total: alerts.len(),
            high,
            medium: alerts.len() - high,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Full published snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Latest published snapshot", body = Dashboard),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_dashboard(
    State(store): State<SharedDashboard>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(published(&store).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Current readings for every region", body = Vec<RegionSnapshot>),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn list_regions(
    State(store): State<SharedDashboard>,
) -> Result<Json<Vec<RegionSnapshot>>, AppError> {
    Ok(Json(published(&store).await?.regions))
}

/// Current readings for one region.
///
/// The name is matched case-insensitively; "west-bengal" and
/// "West%20Bengal" both resolve.
#[utoipa::path(
    get,
    path = "/api/v1/regions/{name}",
    tag = "Dashboard",
    params(
        ("name" = String, Path, description = "Region name, e.g. \"Kerala\" or \"west-bengal\""),
    ),
    responses(
        (status = 200, description = "Current readings for the region", body = RegionSnapshot),
        (status = 404, description = "Unknown region", body = ErrorResponse),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_region(
    State(store): State<SharedDashboard>,
    Path(name): Path<String>,
) -> Result<Json<RegionSnapshot>, AppError> {
    let region: Region = name.parse().map_err(AppError::NotFound)?;
    let dashboard = published(&store).await?;

    dashboard
        .regions
        .into_iter()
        .find(|r| r.name == region)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No readings for region '{}'", region)))
}

#[utoipa::path(
    get,
    path = "/api/v1/trends/rainfall",
    tag = "Dashboard",
    responses(
        (status = 200, description = "24-hour rainfall trend", body = Vec<HourlyRainfallPoint>),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_rainfall_trend(
    State(store): State<SharedDashboard>,
) -> Result<Json<Vec<HourlyRainfallPoint>>, AppError> {
    Ok(Json(published(&store).await?.hourly_rainfall))
}

#[utoipa::path(
    get,
    path = "/api/v1/trends/water",
    tag = "Dashboard",
    responses(
        (status = 200, description = "7-day reservoir level trend", body = Vec<WeeklyWaterPoint>),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_water_trend(
    State(store): State<SharedDashboard>,
) -> Result<Json<Vec<WeeklyWaterPoint>>, AppError> {
    Ok(Json(published(&store).await?.weekly_water))
}

#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Weather summary card", body = WeatherSummary),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(store): State<SharedDashboard>,
) -> Result<Json<WeatherSummary>, AppError> {
    Ok(Json(published(&store).await?.weather))
}

/// Active alerts with per-severity counts.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Active alerts", body = AlertsResponse),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn list_alerts(
    State(store): State<SharedDashboard>,
) -> Result<Json<AlertsResponse>, AppError> {
    let alerts = published(&store).await?.alerts;
    Ok(Json(AlertsResponse {
        summary: AlertSummary::from_alerts(&alerts),
        alerts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertKind;
    use crate::services::forecast::simulate_forecasts;
    use crate::services::refresh::{DashboardStore, RefreshSettings};
    use crate::services::snapshot::generate_snapshot;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    fn empty_store() -> SharedDashboard {
        let settings = RefreshSettings {
            fast_interval: Duration::from_secs(5),
            full_interval: Duration::from_secs(1800),
            probe_timeout: Duration::from_secs(1),
        };
        Arc::new(RwLock::new(DashboardStore::new(&settings)))
    }

    async fn loaded_store() -> SharedDashboard {
        let store = empty_store();
        let now: DateTime<Utc> = "2026-08-10T06:00:00Z".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let snapshot = generate_snapshot(now, &mut rng);
        let forecasts = simulate_forecasts(now, &mut rng);
        store.write().await.dashboard = Some(Dashboard {
            regions: snapshot.live.regions,
            hourly_rainfall: snapshot.trends.hourly_rainfall,
            weekly_water: snapshot.trends.weekly_water,
            weather: snapshot.live.weather,
            alerts: snapshot.live.alerts,
            forecasts,
            regions_updated_at: now,
            full_refresh_at: now,
        });
        store
    }

    fn alert(severity: AlertSeverity) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            region: Region::Kerala,
            kind: AlertKind::HeavyRainfall,
            severity,
            reported_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dashboard_not_ready_before_first_refresh() {
        let err = get_dashboard(State(empty_store())).await.unwrap_err();
        assert!(matches!(err, AppError::NotReady(_)));
        let err = list_alerts(State(empty_store())).await.unwrap_err();
        assert!(matches!(err, AppError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_list_regions() {
        let Json(regions) = list_regions(State(loaded_store().await)).await.unwrap();
        let names: Vec<Region> = regions.iter().map(|r| r.name).collect();
        assert_eq!(names, Region::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_get_region_by_slug() {
        let store = loaded_store().await;
        let Json(region) = get_region(State(store), Path("west-bengal".to_string()))
            .await
            .unwrap();
        assert_eq!(region.name, Region::WestBengal);
    }

    #[tokio::test]
    async fn test_get_region_unknown() {
        let store = loaded_store().await;
        let err = get_region(State(store), Path("Goa".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_trend_lengths() {
        let store = loaded_store().await;
        let Json(rain) = get_rainfall_trend(State(store.clone())).await.unwrap();
        let Json(water) = get_water_trend(State(store)).await.unwrap();
        assert_eq!(rain.len(), 24);
        assert_eq!(water.len(), 7);
    }

    #[tokio::test]
    async fn test_alerts_summary_matches_list() {
        let Json(resp) = list_alerts(State(loaded_store().await)).await.unwrap();
        assert_eq!(resp.summary.total, resp.alerts.len());
        assert_eq!(resp.summary.high + resp.summary.medium, resp.summary.total);
    }

    #[test]
    fn test_alert_summary_counts() {
        let alerts = vec![
            alert(AlertSeverity::High),
            alert(AlertSeverity::Medium),
            alert(AlertSeverity::High),
        ];
        let summary = AlertSummary::from_alerts(&alerts);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high, 2);
        assert_eq!(summary.medium, 1);
    }
}
