//! City forecast generation.
//!
//! Builds current conditions and a 7-day forecast for every tracked city
//! from a season heuristic (monsoon / winter / other). Before simulating,
//! each city's upstream forecast endpoint is probed concurrently; probe
//! outcomes are logged and counted but never change the generated data.
//!
//! Calendar logic (season, forecast dates) runs in Indian Standard Time.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, Utc};
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::{clamp_pct, jitter, round_1dp, round_whole, uniform};
use crate::models::{CityForecast, CurrentConditions, ForecastDay, RainRisk, Season, WeatherIcon};
use crate::services::openweather::OpenWeatherClient;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// UTC offset of Indian Standard Time, in seconds.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Number of forecast days per city.
pub const FORECAST_DAYS: u8 = 7;

/// Rain chance above which rain is expected and the heavy amount range applies (%).
const RAIN_EXPECTED_CHANCE_PCT: f64 = 60.0;

/// Rain chance above which a day is described as partly cloudy (%).
const PARTLY_CLOUDY_CHANCE_PCT: f64 = 30.0;

/// Rain chance from which a day counts as high rain risk (%).
pub const HIGH_RISK_CHANCE_PCT: i32 = 70;

/// Rain chance from which a day counts as moderate rain risk (%).
const MODERATE_RISK_CHANCE_PCT: i32 = 40;

// ---------------------------------------------------------------------------
// Tracked cities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct TrackedCity {
    pub name: &'static str,
    pub state: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub static TRACKED_CITIES: [TrackedCity; 12] = [
    TrackedCity { name: "Mumbai", state: "Maharashtra", latitude: 19.076, longitude: 72.8777 },
    TrackedCity { name: "Delhi", state: "Delhi", latitude: 28.7041, longitude: 77.1025 },
    TrackedCity { name: "Bangalore", state: "Karnataka", latitude: 12.9716, longitude: 77.5946 },
    TrackedCity { name: "Chennai", state: "Tamil Nadu", latitude: 13.0827, longitude: 80.2707 },
    TrackedCity { name: "Kolkata", state: "West Bengal", latitude: 22.5726, longitude: 88.3639 },
    TrackedCity { name: "Hyderabad", state: "Telangana", latitude: 17.385, longitude: 78.4867 },
    TrackedCity { name: "Pune", state: "Maharashtra", latitude: 18.5204, longitude: 73.8567 },
    TrackedCity { name: "Ahmedabad", state: "Gujarat", latitude: 23.0225, longitude: 72.5714 },
    TrackedCity { name: "Jaipur", state: "Rajasthan", latitude: 26.9124, longitude: 75.7873 },
    TrackedCity { name: "Lucknow", state: "Uttar Pradesh", latitude: 26.8467, longitude: 80.9462 },
    TrackedCity { name: "Kochi", state: "Kerala", latitude: 9.9312, longitude: 76.2673 },
    TrackedCity { name: "Bhopal", state: "Madhya Pradesh", latitude: 23.2599, longitude: 77.4126 },
];

// ---------------------------------------------------------------------------
// Season heuristic
// ---------------------------------------------------------------------------

/// Classify a zero-based month index (0 = January).
pub fn classify_season(month0: u32) -> Season {
    match month0 {
        5..=9 => Season::Monsoon,
        11 | 0 | 1 => Season::Winter,
        _ => Season::Other,
    }
}

/// Baseline ranges per season, each `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonProfile {
    pub base_temp_c: (f64, f64),
    pub base_rain_mm: (f64, f64),
    pub base_humidity_pct: (f64, f64),
}

pub fn season_profile(season: Season) -> SeasonProfile {
    match season {
        Season::Winter => SeasonProfile {
            base_temp_c: (15.0, 30.0),
            base_rain_mm: (0.0, 10.0),
            base_humidity_pct: (40.0, 80.0),
        },
        Season::Monsoon => SeasonProfile {
            base_temp_c: (25.0, 35.0),
            base_rain_mm: (10.0, 60.0),
            base_humidity_pct: (70.0, 95.0),
        },
        Season::Other => SeasonProfile {
            base_temp_c: (20.0, 40.0),
            base_rain_mm: (0.0, 10.0),
            base_humidity_pct: (40.0, 80.0),
        },
    }
}

fn draw_between<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    uniform(rng, min, max - min)
}

fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Season at `now`, evaluated in Indian Standard Time.
pub fn season_at(now: DateTime<Utc>) -> Season {
    classify_season(now.with_timezone(&ist()).month0())
}

// ---------------------------------------------------------------------------
// Day classification
// ---------------------------------------------------------------------------

/// Risk band for a rounded rain chance.
pub fn rain_risk(rain_chance_pct: i32) -> RainRisk {
    if rain_chance_pct >= HIGH_RISK_CHANCE_PCT {
        RainRisk::High
    } else if rain_chance_pct >= MODERATE_RISK_CHANCE_PCT {
        RainRisk::Moderate
    } else {
        RainRisk::Low
    }
}

/// Rain amount for a day: `[5, 30)` mm when rain is expected, else `[0, 5)` mm.
pub fn draw_rain_amount<R: Rng + ?Sized>(rain_chance_pct: f64, rng: &mut R) -> f64 {
    if rain_chance_pct > RAIN_EXPECTED_CHANCE_PCT {
        uniform(rng, 5.0, 25.0)
    } else {
        uniform(rng, 0.0, 5.0)
    }
}

fn describe_day(rain_chance_pct: f64) -> (&'static str, WeatherIcon) {
    if rain_chance_pct > RAIN_EXPECTED_CHANCE_PCT {
        ("Rain expected", WeatherIcon::CloudRain)
    } else if rain_chance_pct > PARTLY_CLOUDY_CHANCE_PCT {
        ("Partly cloudy", WeatherIcon::Cloud)
    } else {
        ("Clear", WeatherIcon::Sun)
    }
}

fn describe_season(season: Season) -> (&'static str, WeatherIcon) {
    match season {
        Season::Monsoon => ("Partly cloudy with chance of rain", WeatherIcon::CloudRain),
        Season::Winter => ("Clear sky", WeatherIcon::Cloud),
        Season::Other => ("Sunny", WeatherIcon::Sun),
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Simulate one city's current conditions and 7-day forecast.
pub fn simulate_city_forecast<R: Rng + ?Sized>(
    city: &TrackedCity,
    now: DateTime<Utc>,
    rng: &mut R,
) -> CityForecast {
    let local_now = now.with_timezone(&ist());
    let season = season_at(now);
    let profile = season_profile(season);

    let base_temp = draw_between(rng, profile.base_temp_c);
    let base_rain = draw_between(rng, profile.base_rain_mm);
    let base_humidity = draw_between(rng, profile.base_humidity_pct);

    let (description, icon) = describe_season(season);
    let current = CurrentConditions {
        temperature_c: round_whole(base_temp + jitter(rng, 5.0)),
        humidity_pct: round_whole(clamp_pct(base_humidity)),
        wind_speed_kph: round_whole(uniform(rng, 5.0, 15.0)),
        pressure_hpa: round_whole(uniform(rng, 1000.0, 50.0)),
        description: description.to_string(),
        icon,
    };

    let forecast = (1..=FORECAST_DAYS)
        .map(|offset| {
            let date = local_now.date_naive() + Duration::days(i64::from(offset));
            let day_temp = base_temp + jitter(rng, 8.0);
            let rain_chance = match season {
                Season::Monsoon => uniform(rng, 20.0, 80.0),
                _ => uniform(rng, 0.0, 30.0),
            };
            let rain_amount = draw_rain_amount(rain_chance, rng);
            let max_temp = day_temp + uniform(rng, 0.0, 5.0);
            let min_temp = day_temp - uniform(rng, 0.0, 8.0);
            let humidity = base_humidity + jitter(rng, 20.0);
            let wind = uniform(rng, 5.0, 20.0);
            let (description, icon) = describe_day(rain_chance);
            let rain_chance_pct = round_whole(clamp_pct(rain_chance));

            ForecastDay {
                date,
                date_label: date.format("%a, %-d %b").to_string(),
                weekday_label: date.format("%a").to_string(),
                day_offset: offset,
                max_temp_c: round_whole(max_temp),
                min_temp_c: round_whole(min_temp),
                humidity_pct: round_whole(clamp_pct(humidity)),
                rain_chance_pct,
                rain_amount_mm: round_1dp(rain_amount),
                wind_speed_kph: round_whole(wind),
                description: description.to_string(),
                icon,
                rain_risk: rain_risk(rain_chance_pct),
            }
        })
        .collect();

    CityForecast {
        city: city.name.to_string(),
        state: city.state.to_string(),
        latitude: city.latitude,
        longitude: city.longitude,
        season,
        seasonal_rain_mm: round_1dp(base_rain),
        current,
        forecast,
    }
}

/// Simulate every tracked city, in list order.
pub fn simulate_forecasts<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<CityForecast> {
    TRACKED_CITIES
        .iter()
        .map(|city| simulate_city_forecast(city, now, rng))
        .collect()
}

// ---------------------------------------------------------------------------
// Upstream probe
// ---------------------------------------------------------------------------

/// Result of probing one city's upstream forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Succeeded { entry_count: usize },
    Failed(String),
    TimedOut,
    /// No API key configured.
    Skipped,
}

/// Outcome counts for one full refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProbeReport {
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub skipped: usize,
    /// 3-hour entries returned across all successful probes
    pub upstream_entries: usize,
    /// Error of the last failed probe, in city-list order
    pub last_error: Option<String>,
}

impl ProbeReport {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            match outcome {
                ProbeOutcome::Succeeded { entry_count } => {
                    report.succeeded += 1;
                    report.upstream_entries += *entry_count;
                }
                ProbeOutcome::Failed(reason) => {
                    report.failed += 1;
                    report.last_error = Some(reason.clone());
                }
                ProbeOutcome::TimedOut => report.timed_out += 1,
                ProbeOutcome::Skipped => report.skipped += 1,
            }
        }
        report
    }
}

/// Probe every tracked city concurrently, one outcome per city in list order.
pub async fn probe_cities(
    client: Option<&OpenWeatherClient>,
    timeout: std::time::Duration,
) -> Vec<ProbeOutcome> {
    let Some(client) = client else {
        return vec![ProbeOutcome::Skipped; TRACKED_CITIES.len()];
    };

    let probes = TRACKED_CITIES.iter().map(|city| async move {
        let result =
            tokio::time::timeout(timeout, client.probe_forecast(city.latitude, city.longitude))
                .await;
        match result {
            Ok(Ok(response)) => {
                tracing::debug!(
                    "Forecast probe for {}: {} upstream entries (upstream city: {})",
                    city.name,
                    response.entry_count,
                    response.city.as_deref().unwrap_or("unnamed")
                );
                ProbeOutcome::Succeeded {
                    entry_count: response.entry_count,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Forecast probe for {} failed, simulating: {}", city.name, e);
                ProbeOutcome::Failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Forecast probe for {} timed out after {:?}, simulating",
                    city.name,
                    timeout
                );
                ProbeOutcome::TimedOut
            }
        }
    });

    join_all(probes).await
}

/// Probe the upstream, then simulate forecasts for every tracked city.
///
/// Never fails: probe errors are absorbed into the returned report.
pub async fn generate_forecasts(
    client: Option<&OpenWeatherClient>,
    timeout: std::time::Duration,
    now: DateTime<Utc>,
) -> (Vec<CityForecast>, ProbeReport) {
    let outcomes = probe_cities(client, timeout).await;
    let report = ProbeReport::from_outcomes(&outcomes);

    // Randomness is drawn after all awaits; the thread-local rng is not Send.
    let forecasts = simulate_forecasts(now, &mut rand::rng());
    (forecasts, report)
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Weekly rainfall outlook across a set of city forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RainOutlook {
    /// State filter applied, if any
    pub state: Option<String>,
    pub city_count: usize,
    /// Sum of expected rainfall over all cities and days (1 dp)
    pub total_expected_rain_mm: f64,
    /// Mean over cities of each city's mean daily rain chance
    pub avg_rain_chance_pct: i32,
    /// Cities with at least one high-risk day
    pub high_risk_cities: usize,
    pub avg_current_temp_c: i32,
}

/// Summarise forecasts, optionally restricted to one state (case-insensitive).
pub fn summarise_outlook(forecasts: &[CityForecast], state: Option<&str>) -> RainOutlook {
    let selected: Vec<&CityForecast> = forecasts
        .iter()
        .filter(|c| state.map_or(true, |s| c.state.eq_ignore_ascii_case(s)))
        .collect();

    let city_count = selected.len();
    let total_rain: f64 = selected
        .iter()
        .flat_map(|c| c.forecast.iter())
        .map(|d| d.rain_amount_mm)
        .sum();

    let (avg_rain_chance_pct, avg_current_temp_c) = if city_count == 0 {
        (0, 0)
    } else {
        let chance_sum: f64 = selected
            .iter()
            .filter(|c| !c.forecast.is_empty())
            .map(|c| {
                let days = c.forecast.len() as f64;
                c.forecast
                    .iter()
                    .map(|d| f64::from(d.rain_chance_pct))
                    .sum::<f64>()
                    / days
            })
            .sum();
        let temp_sum: f64 = selected
            .iter()
            .map(|c| f64::from(c.current.temperature_c))
            .sum();
        (
            round_whole(chance_sum / city_count as f64),
            round_whole(temp_sum / city_count as f64),
        )
    };

    let high_risk_cities = selected
        .iter()
        .filter(|c| {
            c.forecast
                .iter()
                .any(|d| d.rain_chance_pct >= HIGH_RISK_CHANCE_PCT)
        })
        .count();

    RainOutlook {
        state: state.map(|s| s.to_string()),
        city_count,
        total_expected_rain_mm: round_1dp(total_rain),
        avg_rain_chance_pct,
        high_risk_cities,
        avg_current_temp_c,
    }
}

/// Distinct state names in order of first appearance.
pub fn distinct_states(forecasts: &[CityForecast]) -> Vec<String> {
    let mut states: Vec<String> = Vec::new();
    for c in forecasts {
        if !states.iter().any(|s| s == &c.state) {
            states.push(c.state.clone());
        }
    }
    states
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
