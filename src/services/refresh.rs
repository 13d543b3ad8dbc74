//! Background refresh loop for the published dashboard.
//!
//! Two timers share one task:
//! - fast cycle (default 5 s): regenerate region readings, alerts and the
//!   weather summary, merging them into the current snapshot
//! - full cycle (default 30 min, plus once at startup): probe the upstream
//!   forecast endpoint, then regenerate everything and replace the snapshot
//!
//! Every tick produces a new `Dashboard` through `reduce`; the store is only
//! ever swapped, never edited field by field. Because both timers live in
//! one `select!` loop, merges cannot interleave. A full refresh waiting on
//! upstream probes is held as a pending future so fast ticks keep running.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::{BoxFuture, OptionFuture};
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use utoipa::ToSchema;

use crate::models::{CityForecast, Dashboard};
use crate::services::forecast::{generate_forecasts, ProbeReport};
use crate::services::openweather::OpenWeatherClient;
use crate::services::snapshot::{generate_live_readings, generate_snapshot, LiveReadings, Snapshot};

// ---------------------------------------------------------------------------
// Published state (in-memory, shared via Arc<RwLock<>>)
// ---------------------------------------------------------------------------

/// Refresh loop status, exposed via the status endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshStatus {
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub fast_interval_secs: u64,
    pub full_interval_secs: u64,
    pub next_full_refresh_at: Option<DateTime<Utc>>,
    pub last_fast_refresh_at: Option<DateTime<Utc>>,
    pub last_full_refresh_at: Option<DateTime<Utc>>,
    pub last_full_refresh_duration_ms: Option<u64>,
    pub fast_ticks: u64,
    pub full_ticks: u64,
    /// Upstream probe outcomes of the latest full refresh
    pub last_probe: Option<ProbeReport>,
}

/// The published snapshot plus loop bookkeeping.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    /// `None` until the first full refresh completes.
    pub dashboard: Option<Dashboard>,
    pub status: RefreshStatus,
}

impl DashboardStore {
    pub fn new(settings: &RefreshSettings) -> Self {
        Self {
            dashboard: None,
            status: RefreshStatus {
                active: true,
                started_at: Utc::now(),
                fast_interval_secs: settings.fast_interval.as_secs(),
                full_interval_secs: settings.full_interval.as_secs(),
                next_full_refresh_at: None,
                last_fast_refresh_at: None,
                last_full_refresh_at: None,
                last_full_refresh_duration_ms: None,
                fast_ticks: 0,
                full_ticks: 0,
                last_probe: None,
            },
        }
    }
}

/// Shared dashboard handle.
pub type SharedDashboard = Arc<RwLock<DashboardStore>>;

/// Timer and probe settings for the refresh loop.
#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub fast_interval: Duration,
    pub full_interval: Duration,
    pub probe_timeout: Duration,
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Result of one full refresh.
#[derive(Debug, Clone)]
pub struct FullRefresh {
    pub snapshot: Snapshot,
    pub forecasts: Vec<CityForecast>,
    pub probe: ProbeReport,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// A tick's output, ready to be folded into the published snapshot.
#[derive(Debug, Clone)]
pub enum RefreshUpdate {
    Fast(LiveReadings),
    Full(Box<FullRefresh>),
}

/// Fold an update into the previous snapshot.
///
/// A fast update keeps trends and forecasts from `previous` and yields
/// `None` while nothing has been published yet. A full update always
/// yields a complete replacement.
pub fn reduce(previous: Option<&Dashboard>, update: RefreshUpdate) -> Option<Dashboard> {
    match update {
        RefreshUpdate::Fast(live) => previous.map(|prev| Dashboard {
            regions: live.regions,
            alerts: live.alerts,
            weather: live.weather,
            regions_updated_at: live.generated_at,
            hourly_rainfall: prev.hourly_rainfall.clone(),
            weekly_water: prev.weekly_water.clone(),
            forecasts: prev.forecasts.clone(),
            full_refresh_at: prev.full_refresh_at,
        }),
        RefreshUpdate::Full(full) => {
            let FullRefresh {
                snapshot,
                forecasts,
                completed_at,
                ..
            } = *full;
            Some(Dashboard {
                regions: snapshot.live.regions,
                alerts: snapshot.live.alerts,
                weather: snapshot.live.weather,
                regions_updated_at: snapshot.live.generated_at,
                hourly_rainfall: snapshot.trends.hourly_rainfall,
                weekly_water: snapshot.trends.weekly_water,
                forecasts,
                full_refresh_at: completed_at,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Main refresh loop
// ---------------------------------------------------------------------------

/// Probe upstream, then regenerate every dashboard field.
pub async fn full_refresh(
    client: Option<OpenWeatherClient>,
    probe_timeout: Duration,
) -> FullRefresh {
    let started_at = Utc::now();
    let (forecasts, probe) = generate_forecasts(client.as_ref(), probe_timeout, started_at).await;
    let completed_at = Utc::now();
    let snapshot = generate_snapshot(completed_at, &mut rand::rng());

    FullRefresh {
        snapshot,
        forecasts,
        probe,
        started_at,
        completed_at,
    }
}

/// Run the refresh loop until `shutdown` flips to `true` or its sender drops.
///
/// Should be spawned via `tokio::spawn(run_refresh_loop(...))`.
pub async fn run_refresh_loop(
    settings: RefreshSettings,
    client: Option<OpenWeatherClient>,
    store: SharedDashboard,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        "Refresh loop started (fast every {:?}, full every {:?}, upstream probe {})",
        settings.fast_interval,
        settings.full_interval,
        if client.is_some() { "enabled" } else { "disabled" }
    );

    // First full tick fires immediately: that is the startup run.
    let mut full_timer = tokio::time::interval(settings.full_interval);
    full_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut fast_timer = tokio::time::interval_at(
        Instant::now() + settings.fast_interval,
        settings.fast_interval,
    );
    fast_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut pending: Option<BoxFuture<'static, FullRefresh>> = None;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = full_timer.tick() => {
                if pending.is_some() {
                    tracing::warn!("Refresh: previous full refresh still running, skipping tick");
                } else {
                    tracing::debug!("Refresh: starting full refresh");
                    pending = Some(full_refresh(client.clone(), settings.probe_timeout).boxed());
                    schedule_next_full(&store, settings.full_interval).await;
                }
            }
            Some(refresh) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                apply_full(&store, refresh).await;
            }
            _ = fast_timer.tick() => {
                let readings = generate_live_readings(Utc::now(), &mut rand::rng());
                apply_fast(&store, readings).await;
            }
        }
    }

    if pending.take().is_some() {
        tracing::info!("Refresh: dropping in-flight full refresh on shutdown");
    }
    store.write().await.status.active = false;
    tracing::info!("Refresh loop stopped");
}

async fn schedule_next_full(store: &SharedDashboard, full_interval: Duration) {
    let next = ChronoDuration::from_std(full_interval)
        .ok()
        .map(|d| Utc::now() + d);
    store.write().await.status.next_full_refresh_at = next;
}

/// Merge a fast tick into the store.
async fn apply_fast(store: &SharedDashboard, readings: LiveReadings) {
    let generated_at = readings.generated_at;
    let alert_count = readings.alerts.len();

    let mut s = store.write().await;
    match reduce(s.dashboard.as_ref(), RefreshUpdate::Fast(readings)) {
        Some(next) => {
            s.dashboard = Some(next);
            s.status.fast_ticks += 1;
            s.status.last_fast_refresh_at = Some(generated_at);
            tracing::debug!("Refresh: fast tick published ({} active alerts)", alert_count);
        }
        None => {
            tracing::debug!("Refresh: fast tick skipped, no snapshot published yet");
        }
    }
}

/// Replace the store contents with a full refresh.
async fn apply_full(store: &SharedDashboard, refresh: FullRefresh) {
    let duration_ms = (refresh.completed_at - refresh.started_at)
        .num_milliseconds()
        .max(0) as u64;
    let completed_at = refresh.completed_at;
    let probe = refresh.probe.clone();
    let city_count = refresh.forecasts.len();

    let mut s = store.write().await;
    s.dashboard = reduce(s.dashboard.as_ref(), RefreshUpdate::Full(Box::new(refresh)));
    s.status.full_ticks += 1;
    s.status.last_full_refresh_at = Some(completed_at);
    s.status.last_full_refresh_duration_ms = Some(duration_ms);
    s.status.last_probe = Some(probe.clone());

    tracing::info!(
        "Refresh: full refresh complete in {}ms ({} cities; probes ok={} failed={} timed_out={} skipped={})",
        duration_ms,
        city_count,
        probe.succeeded,
        probe.failed,
        probe.timed_out,
        probe.skipped,
    );
    if let Some(reason) = &probe.last_error {
        tracing::warn!("Refresh: last upstream probe failure: {}", reason);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
