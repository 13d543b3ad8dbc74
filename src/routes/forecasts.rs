//! City forecast HTTP endpoints.
//!
//! - GET /api/v1/forecasts?state=NAME
//! - GET /api/v1/forecasts/states
//! - GET /api/v1/forecasts/outlook?state=NAME
//! - GET /api/v1/forecasts/city/:city

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::models::CityForecast;
use crate::routes::published;
use crate::services::forecast::{distinct_states, summarise_outlook, RainOutlook};
use crate::services::refresh::SharedDashboard;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ForecastQuery {
    /// Restrict to one state (case-insensitive, e.g. "Maharashtra")
    pub state: Option<String>,
}

impl ForecastQuery {
    /// Blank filters mean "all states".
    fn state(&self) -> Option<&str> {
        self.state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// City forecasts, optionally filtered by state.
///
/// An unknown state yields an empty list rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1/forecasts",
    tag = "Forecasts",
    params(ForecastQuery),
    responses(
        (status = 200, description = "7-day forecasts per city", body = Vec<CityForecast>),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn list_forecasts(
    State(store): State<SharedDashboard>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Vec<CityForecast>>, AppError> {
    let forecasts = published(&store).await?.forecasts;
    let filtered = match params.state() {
        Some(state) => forecasts
            .into_iter()
            .filter(|c| c.state.eq_ignore_ascii_case(state))
            .collect(),
        None => forecasts,
    };
    Ok(Json(filtered))
}

#[utoipa::path(
    get,
    path = "/api/v1/forecasts/states",
    tag = "Forecasts",
    responses(
        (status = 200, description = "States with at least one tracked city", body = Vec<String>),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn list_states(
    State(store): State<SharedDashboard>,
) -> Result<Json<Vec<String>>, AppError> {
    let dashboard = published(&store).await?;
    Ok(Json(distinct_states(&dashboard.forecasts)))
}

/// Weekly rain outlook: expected rain, mean rain chance, high-risk cities.
#[utoipa::path(
    get,
    path = "/api/v1/forecasts/outlook",
    tag = "Forecasts",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Aggregated weekly outlook", body = RainOutlook),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_outlook(
    State(store): State<SharedDashboard>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<RainOutlook>, AppError> {
    let dashboard = published(&store).await?;
    Ok(Json(summarise_outlook(&dashboard.forecasts, params.state())))
}

#[utoipa::path(
    get,
    path = "/api/v1/forecasts/city/{city}",
    tag = "Forecasts",
    params(
        ("city" = String, Path, description = "City name, case-insensitive (e.g. \"Mumbai\")"),
    ),
    responses(
        (status = 200, description = "7-day forecast for the city", body = CityForecast),
        (status = 404, description = "City not tracked", body = ErrorResponse),
        (status = 503, description = "First full refresh has not completed", body = ErrorResponse),
    )
)]
pub async fn get_city_forecast(
    State(store): State<SharedDashboard>,
    Path(city): Path<String>,
) -> Result<Json<CityForecast>, AppError> {
    let wanted = city.trim();
    published(&store)
        .await?
        .forecasts
        .into_iter()
        .find(|c| c.city.eq_ignore_ascii_case(wanted))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("City '{}' is not tracked", wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dashboard;
    use crate::services::forecast::{simulate_forecasts, TRACKED_CITIES};
    use crate::services::refresh::{DashboardStore, RefreshSettings};
    use crate::services::snapshot::generate_snapshot;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;

    async fn loaded_store() -> SharedDashboard {
        let settings = RefreshSettings {
            fast_interval: Duration::from_secs(5),
            full_interval: Duration::from_secs(1800),
            probe_timeout: Duration::from_secs(1),
        };
        let store = Arc::new(RwLock::new(DashboardStore::new(&settings)));
        let now: DateTime<Utc> = "2026-01-15T06:00:00Z".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let snapshot = generate_snapshot(now, &mut rng);
        store.write().await.dashboard = Some(Dashboard {
            regions: snapshot.live.regions,
            hourly_rainfall: snapshot.trends.hourly_rainfall,
            weekly_water: snapshot.trends.weekly_water,
            weather: snapshot.live.weather,
            alerts: snapshot.live.alerts,
            forecasts: simulate_forecasts(now, &mut rng),
            regions_updated_at: now,
            full_refresh_at: now,
        });
        store
    }

    fn query(state: Option<&str>) -> Query<ForecastQuery> {
        Query(ForecastQuery {
            state: state.map(|s| s.to_string()),
        })
    }

    #[tokio::test]
    async fn test_list_forecasts_unfiltered() {
        let Json(all) = list_forecasts(State(loaded_store().await), query(None))
            .await
            .unwrap();
        assert_eq!(all.len(), TRACKED_CITIES.len());
    }

    #[tokio::test]
    async fn test_list_forecasts_by_state() {
        let store = loaded_store().await;
        let state = TRACKED_CITIES[0].state;
        let expected = TRACKED_CITIES.iter().filter(|c| c.state == state).count();

        let Json(filtered) = list_forecasts(State(store), query(Some(&state.to_uppercase())))
            .await
            .unwrap();
        assert_eq!(filtered.len(), expected);
        assert!(filtered.iter().all(|c| c.state == state));
    }

    #[tokio::test]
    async fn test_blank_state_means_all() {
        let Json(all) = list_forecasts(State(loaded_store().await), query(Some("  ")))
            .await
            .unwrap();
        assert_eq!(all.len(), TRACKED_CITIES.len());
    }

    #[tokio::test]
    async fn test_unknown_state_is_empty() {
        let Json(none) = list_forecasts(State(loaded_store().await), query(Some("Atlantis")))
            .await
            .unwrap();
        assert!(none.is_empty());

        let Json(outlook) = get_outlook(State(loaded_store().await), query(Some("Atlantis")))
            .await
            .unwrap();
        assert_eq!(outlook.city_count, 0);
        assert_eq!(outlook.total_expected_rain_mm, 0.0);
    }

    #[tokio::test]
    async fn test_list_states_distinct() {
        let Json(states) = list_states(State(loaded_store().await)).await.unwrap();
        let mut deduped = states.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), states.len());
        assert!(states.iter().any(|s| s == TRACKED_CITIES[0].state));
    }

    #[tokio::test]
    async fn test_city_lookup_case_insensitive() {
        let name = TRACKED_CITIES[3].name;
        let Json(city) = get_city_forecast(
            State(loaded_store().await),
            Path(name.to_lowercase()),
        )
        .await
        .unwrap();
        assert_eq!(city.city, name);
        assert_eq!(city.forecast.len(), 7);
    }

    #[tokio::test]
    async fn test_city_lookup_unknown() {
        let err = get_city_forecast(State(loaded_store().await), Path("Gotham".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
