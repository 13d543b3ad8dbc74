// Rainfall Monitor API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use services::openweather::OpenWeatherClient;
use services::refresh::{DashboardStore, RefreshSettings, SharedDashboard};

/// OpenAPI document for the Rainfall Monitor API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rainfall Monitor API",
        version = "0.1.0",
        description = "Simulated rainfall and reservoir monitoring for Indian states, \
            with 7-day rain forecasts for major cities. Region readings refresh every \
            few seconds; trends and forecasts are regenerated on a slower cycle after \
            a best-effort probe of the OpenWeatherMap forecast endpoint.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Dashboard", description = "Region readings, trends, weather and alerts"),
        (name = "Forecasts", description = "City rain forecasts and weekly outlook"),
        (name = "Refresh", description = "Background refresh loop status"),
    ),
    paths(
        routes::health::health_check,
        routes::dashboard::get_dashboard,
        routes::dashboard::list_regions,
        routes::dashboard::get_region,
        routes::dashboard::get_rainfall_trend,
        routes::dashboard::get_water_trend,
        routes::dashboard::get_weather,
        routes::dashboard::list_alerts,
        routes::forecasts::list_forecasts,
        routes::forecasts::list_states,
        routes::forecasts::get_outlook,
        routes::forecasts::get_city_forecast,
        routes::refresh::get_refresh_status,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::dashboard::AlertSummary,
            routes::dashboard::AlertsResponse,
            models::Dashboard,
            models::Region,
            models::RegionStatus,
            models::RegionSnapshot,
            models::HourlyRainfallPoint,
            models::WeeklyWaterPoint,
            models::AlertKind,
            models::AlertSeverity,
            models::Alert,
            models::WeatherSummary,
            models::Season,
            models::WeatherIcon,
            models::RainRisk,
            models::CurrentConditions,
            models::ForecastDay,
            models::CityForecast,
            services::forecast::RainOutlook,
            services::forecast::ProbeReport,
            services::refresh::RefreshStatus,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rainfall_monitor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Upstream probe client, only when a key is configured
    let client = match config.weather_api_key.as_deref() {
        Some(key) => match OpenWeatherClient::new(
            &config.weather_api_url,
            key,
            &config.weather_user_agent,
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!("Upstream probe disabled: {}", e);
                None
            }
        },
        None => {
            tracing::info!("WEATHER_API_KEY not set, forecasts are simulated without probing");
            None
        }
    };

    let settings = RefreshSettings {
        fast_interval: config.fast_refresh,
        full_interval: config.full_refresh,
        probe_timeout: config.probe_timeout,
    };

    // Shared snapshot store and background refresh loop
    let store: SharedDashboard = Arc::new(RwLock::new(DashboardStore::new(&settings)));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = tokio::spawn(services::refresh::run_refresh_loop(
        settings,
        client,
        store.clone(),
        shutdown_rx,
    ));

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let dashboard_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/dashboard", get(routes::dashboard::get_dashboard))
        .route("/api/v1/regions", get(routes::dashboard::list_regions))
        .route("/api/v1/regions/:name", get(routes::dashboard::get_region))
        .route(
            "/api/v1/trends/rainfall",
            get(routes::dashboard::get_rainfall_trend),
        )
        .route("/api/v1/trends/water", get(routes::dashboard::get_water_trend))
        .route("/api/v1/weather", get(routes::dashboard::get_weather))
        .route("/api/v1/alerts", get(routes::dashboard::list_alerts))
        .route(
            "/api/v1/refresh/status",
            get(routes::refresh::get_refresh_status),
        )
        .with_state(store.clone());

    let forecast_routes = Router::new()
        .route("/api/v1/forecasts", get(routes::forecasts::list_forecasts))
        .route(
            "/api/v1/forecasts/states",
            get(routes::forecasts::list_states),
        )
        .route(
            "/api/v1/forecasts/outlook",
            get(routes::forecasts::get_outlook),
        )
        .route(
            "/api/v1/forecasts/city/:city",
            get(routes::forecasts::get_city_forecast),
        )
        .with_state(store);

    let app = Router::new()
        .merge(dashboard_routes)
        .merge(forecast_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind TCP listener on {}: {}", addr, e);
            let _ = shutdown_tx.send(true);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server terminated unexpectedly: {}", e);
    }

    // Stop both refresh timers before exiting
    let _ = shutdown_tx.send(true);
    if let Err(e) = refresher.await {
        tracing::error!("Refresh loop panicked: {}", e);
    }
    tracing::info!("Shutdown complete");
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
