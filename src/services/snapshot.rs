//! Snapshot generator for regional readings.
//!
//! Produces randomized rainfall, water-level, temperature and humidity
//! readings for every tracked region, the hourly rainfall and weekly
//! reservoir trends, a weather summary card, and the alert list derived
//! from alert-status regions.
//!
//! All functions are total and take the clock and random source as
//! arguments so that tests can drive them with a seeded `StdRng`.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::helpers::{round_whole, uniform};
use crate::models::{
    Alert, AlertKind, AlertSeverity, HourlyRainfallPoint, Region, RegionSnapshot, RegionStatus,
    WeatherSummary, WeeklyWaterPoint,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rainfall above which an alert region is classified as heavy rainfall (mm).
const HEAVY_RAINFALL_MM: f64 = 60.0;

/// Water level below which an alert region is classified as low water (%).
const LOW_WATER_LEVEL_PCT: f64 = 30.0;

/// Severity draw above which an alert is `High`.
const HIGH_SEVERITY_THRESHOLD: f64 = 0.5;

const HOURS_PER_DAY: u8 = 24;
const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ---------------------------------------------------------------------------
// Region profiles
// ---------------------------------------------------------------------------

/// Uniform range expressed as `offset + u * scale`, i.e. `[offset, offset + scale)`.
#[derive(Debug, Clone, Copy)]
pub struct MetricRange {
    pub offset: f64,
    pub scale: f64,
}

impl MetricRange {
    const fn new(offset: f64, scale: f64) -> Self {
        Self { offset, scale }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        uniform(rng, self.offset, self.scale)
    }
}

/// Generation ranges for one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionProfile {
    pub region: Region,
    pub rainfall_mm: MetricRange,
    pub water_level_pct: MetricRange,
    pub temperature_c: MetricRange,
    pub humidity_pct: MetricRange,
    /// The region is in alert when a fresh uniform draw exceeds this value.
    pub alert_threshold: f64,
}

pub static REGION_PROFILES: [RegionProfile; 6] = [
    RegionProfile {
        region: Region::Maharashtra,
        rainfall_mm: MetricRange::new(20.0, 50.0),
        water_level_pct: MetricRange::new(40.0, 30.0),
        temperature_c: MetricRange::new(25.0, 10.0),
        humidity_pct: MetricRange::new(60.0, 30.0),
        alert_threshold: 0.7,
    },
    RegionProfile {
        region: Region::Kerala,
        rainfall_mm: MetricRange::new(30.0, 80.0),
        water_level_pct: MetricRange::new(50.0, 25.0),
        temperature_c: MetricRange::new(28.0, 8.0),
        humidity_pct: MetricRange::new(70.0, 25.0),
        alert_threshold: 0.6,
    },
    RegionProfile {
        region: Region::Rajasthan,
        rainfall_mm: MetricRange::new(5.0, 20.0),
        water_level_pct: MetricRange::new(20.0, 40.0),
        temperature_c: MetricRange::new(30.0, 12.0),
        humidity_pct: MetricRange::new(40.0, 20.0),
        alert_threshold: 0.8,
    },
    RegionProfile {
        region: Region::WestBengal,
        rainfall_mm: MetricRange::new(25.0, 60.0),
        water_level_pct: MetricRange::new(35.0, 35.0),
        temperature_c: MetricRange::new(26.0, 9.0),
        humidity_pct: MetricRange::new(65.0, 28.0),
        alert_threshold: 0.7,
    },
    RegionProfile {
        region: Region::TamilNadu,
        rainfall_mm: MetricRange::new(15.0, 45.0),
        water_level_pct: MetricRange::new(30.0, 30.0),
        temperature_c: MetricRange::new(27.0, 10.0),
        humidity_pct: MetricRange::new(60.0, 25.0),
        alert_threshold: 0.75,
    },
    RegionProfile {
        region: Region::UttarPradesh,
        rainfall_mm: MetricRange::new(10.0, 35.0),
        water_level_pct: MetricRange::new(25.0, 45.0),
        temperature_c: MetricRange::new(24.0, 11.0),
        humidity_pct: MetricRange::new(55.0, 30.0),
        alert_threshold: 0.8,
    },
];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Output of the fast cycle.
#[derive(Debug, Clone)]
pub struct LiveReadings {
    pub regions: Vec<RegionSnapshot>,
    pub alerts: Vec<Alert>,
    pub weather: WeatherSummary,
    pub generated_at: DateTime<Utc>,
}

/// Output of the trend generators, refreshed only on the full cycle.
#[derive(Debug, Clone)]
pub struct Trends {
    pub hourly_rainfall: Vec<HourlyRainfallPoint>,
    pub weekly_water: Vec<WeeklyWaterPoint>,
}

/// Everything the snapshot generator produces in one go.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub live: LiveReadings,
    pub trends: Trends,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a complete snapshot: live readings plus both trends.
pub fn generate_snapshot<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Snapshot {
    Snapshot {
        live: generate_live_readings(now, rng),
        trends: generate_trends(rng),
    }
}

/// Generate region readings, derived alerts and the weather summary.
pub fn generate_live_readings<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> LiveReadings {
    let regions = generate_regions(now, rng);
    let alerts = derive_alerts(&regions, rng);
    let weather = generate_weather_summary(rng);

    LiveReadings {
        regions,
        alerts,
        weather,
        generated_at: now,
    }
}

/// Generate both trend series.
pub fn generate_trends<R: Rng + ?Sized>(rng: &mut R) -> Trends {
    Trends {
        hourly_rainfall: generate_hourly_rainfall(rng),
        weekly_water: generate_weekly_water(rng),
    }
}

/// One snapshot per configured region, in table order.
pub fn generate_regions<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<RegionSnapshot> {
    REGION_PROFILES
        .iter()
        .map(|profile| generate_region(profile, now, rng))
        .collect()
}

fn generate_region<R: Rng + ?Sized>(
    profile: &RegionProfile,
    now: DateTime<Utc>,
    rng: &mut R,
) -> RegionSnapshot {
    let rainfall_mm = profile.rainfall_mm.sample(rng);
    let water_level_pct = profile.water_level_pct.sample(rng);
    let temperature_c = profile.temperature_c.sample(rng);
    let humidity_pct = profile.humidity_pct.sample(rng);
    let status = if rng.random::<f64>() > profile.alert_threshold {
        RegionStatus::Alert
    } else {
        RegionStatus::Normal
    };

    RegionSnapshot {
        name: profile.region,
        rainfall_mm,
        water_level_pct,
        temperature_c,
        humidity_pct,
        status,
        last_updated: now,
    }
}

/// Classify an alert from a region's rainfall and water level.
pub fn classify_alert(rainfall_mm: f64, water_level_pct: f64) -> AlertKind {
    if rainfall_mm > HEAVY_RAINFALL_MM {
        AlertKind::HeavyRainfall
    } else if water_level_pct < LOW_WATER_LEVEL_PCT {
        AlertKind::LowWaterLevel
    } else {
        AlertKind::WeatherAlert
    }
}

/// One alert per alert-status region, in region order.
pub fn derive_alerts<R: Rng + ?Sized>(regions: &[RegionSnapshot], rng: &mut R) -> Vec<Alert> {
    regions
        .iter()
        .filter(|r| r.status == RegionStatus::Alert)
        .map(|r| {
            let severity = if rng.random::<f64>() > HIGH_SEVERITY_THRESHOLD {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            Alert {
                id: Uuid::new_v4(),
                region: r.name,
                kind: classify_alert(r.rainfall_mm, r.water_level_pct),
                severity,
                reported_at: r.last_updated,
            }
        })
        .collect()
}

/// 24 hourly points labelled "0:00".."23:00".
pub fn generate_hourly_rainfall<R: Rng + ?Sized>(rng: &mut R) -> Vec<HourlyRainfallPoint> {
    (0..HOURS_PER_DAY)
        .map(|hour| HourlyRainfallPoint {
            hour,
            hour_label: format!("{}:00", hour),
            rainfall_mm: uniform(rng, 2.0, 15.0),
            intensity: uniform(rng, 1.0, 10.0),
        })
        .collect()
}

/// 7 daily reservoir points labelled Mon..Sun.
pub fn generate_weekly_water<R: Rng + ?Sized>(rng: &mut R) -> Vec<WeeklyWaterPoint> {
    WEEKDAY_LABELS
        .iter()
        .map(|day| WeeklyWaterPoint {
            day_label: (*day).to_string(),
            level_pct: uniform(rng, 30.0, 20.0),
            capacity_pct: uniform(rng, 60.0, 15.0),
        })
        .collect()
}

/// Weather summary card, every field rounded to a whole unit.
pub fn generate_weather_summary<R: Rng + ?Sized>(rng: &mut R) -> WeatherSummary {
    WeatherSummary {
        temperature_c: round_whole(uniform(rng, 28.0, 10.0)),
        humidity_pct: round_whole(uniform(rng, 60.0, 30.0)),
        wind_speed_kph: round_whole(uniform(rng, 5.0, 20.0)),
        pressure_hpa: round_whole(uniform(rng, 1000.0, 50.0)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn profile_for(region: Region) -> Option<&'static RegionProfile> {
        REGION_PROFILES.iter().find(|p| p.region == region)
    }

    fn now() -> DateTime<Utc> {
        "2026-07-15T06:30:00Z".parse::<DateTime<Utc>>().unwrap()
    }

    fn region_with(rainfall_mm: f64, water_level_pct: f64, status: RegionStatus) -> RegionSnapshot {
        RegionSnapshot {
            name: Region::Kerala,
            rainfall_mm,
            water_level_pct,
            temperature_c: 30.0,
            humidity_pct: 80.0,
            status,
            last_updated: now(),
        }
    }

    #[test]
    fn test_region_metrics_within_profile_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            for snapshot in generate_regions(now(), &mut rng) {
                let p = profile_for(snapshot.name).unwrap();
                let checks = [
                    ("rainfall", snapshot.rainfall_mm, p.rainfall_mm),
                    ("water level", snapshot.water_level_pct, p.water_level_pct),
                    ("temperature", snapshot.temperature_c, p.temperature_c),
                    ("humidity", snapshot.humidity_pct, p.humidity_pct),
                ];
                for (label, value, range) in checks {
                    let (min, max) = (range.offset, range.offset + range.scale);
                    assert!(
                        value >= min && value < max,
                        "{} {} out of [{}, {}) for {}",
                        label,
                        value,
                        min,
                        max,
                        snapshot.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_regions_match_configured_list() {
        let mut rng = StdRng::seed_from_u64(1);
        let regions = generate_regions(now(), &mut rng);
        let names: Vec<Region> = regions.iter().map(|r| r.name).collect();
        assert_eq!(names, Region::ALL.to_vec());
    }

    #[test]
    fn test_profiles_cover_every_region_once() {
        let profiled: HashSet<Region> = REGION_PROFILES.iter().map(|p| p.region).collect();
        assert_eq!(profiled.len(), REGION_PROFILES.len());
        for region in Region::ALL {
            assert!(profile_for(region).is_some(), "missing profile for {}", region);
        }
    }

    #[test]
    fn test_alert_thresholds_in_reference_band() {
        for p in &REGION_PROFILES {
            assert!(
                (0.6..=0.8).contains(&p.alert_threshold),
                "{} threshold {}",
                p.region,
                p.alert_threshold
            );
        }
    }

    #[test]
    fn test_classify_alert() {
        assert_eq!(classify_alert(60.1, 10.0), AlertKind::HeavyRainfall);
        assert_eq!(classify_alert(60.0, 29.9), AlertKind::LowWaterLevel);
        assert_eq!(classify_alert(45.0, 30.0), AlertKind::WeatherAlert);
        assert_eq!(classify_alert(80.0, 80.0), AlertKind::HeavyRainfall);
    }

    #[test]
    fn test_derive_alerts_only_for_alert_regions() {
        let mut rng = StdRng::seed_from_u64(3);
        let regions = vec![
            region_with(70.0, 50.0, RegionStatus::Alert),
            region_with(10.0, 20.0, RegionStatus::Normal),
            region_with(10.0, 20.0, RegionStatus::Alert),
        ];
        let alerts = derive_alerts(&regions, &mut rng);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::HeavyRainfall);
        assert_eq!(alerts[1].kind, AlertKind::LowWaterLevel);
        assert_eq!(alerts[0].reported_at, now());
    }

    #[test]
    fn test_alerts_biject_with_alert_regions() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let live = generate_live_readings(now(), &mut rng);
            let alert_regions: Vec<Region> = live
                .regions
                .iter()
                .filter(|r| r.status == RegionStatus::Alert)
                .map(|r| r.name)
                .collect();
            let alerted: Vec<Region> = live.alerts.iter().map(|a| a.region).collect();
            assert_eq!(alerted, alert_regions);

            for alert in &live.alerts {
                let region = live.regions.iter().find(|r| r.name == alert.region).unwrap();
                assert_eq!(
                    alert.kind,
                    classify_alert(region.rainfall_mm, region.water_level_pct)
                );
            }

            let ids: HashSet<Uuid> = live.alerts.iter().map(|a| a.id).collect();
            assert_eq!(ids.len(), live.alerts.len(), "alert ids must be unique");
        }
    }

    #[test]
    fn test_hourly_rainfall_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let points = generate_hourly_rainfall(&mut rng);
        assert_eq!(points.len(), 24);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.hour as usize, i);
            assert_eq!(p.hour_label, format!("{}:00", i));
            assert!((2.0..17.0).contains(&p.rainfall_mm));
            assert!((1.0..11.0).contains(&p.intensity));
        }
        assert_eq!(points[0].hour_label, "0:00");
        assert_eq!(points[23].hour_label, "23:00");
    }

    #[test]
    fn test_weekly_water_shape() {
        let mut rng = StdRng::seed_from_u64(6);
        let points = generate_weekly_water(&mut rng);
        let labels: Vec<&str> = points.iter().map(|p| p.day_label.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        for p in &points {
            assert!((30.0..50.0).contains(&p.level_pct));
            assert!((60.0..75.0).contains(&p.capacity_pct));
        }
    }

    #[test]
    fn test_weather_summary_ranges() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let w = generate_weather_summary(&mut rng);
            // Rounding may land on the exclusive upper bound.
            assert!((28..=38).contains(&w.temperature_c));
            assert!((60..=90).contains(&w.humidity_pct));
            assert!((5..=25).contains(&w.wind_speed_kph));
            assert!((1000..=1050).contains(&w.pressure_hpa));
        }
    }

    #[test]
    fn test_generate_snapshot_is_complete() {
        let mut rng = StdRng::seed_from_u64(10);
        let snapshot = generate_snapshot(now(), &mut rng);
        assert_eq!(snapshot.live.regions.len(), 6);
        assert_eq!(snapshot.trends.hourly_rainfall.len(), 24);
        assert_eq!(snapshot.trends.weekly_water.len(), 7);
        assert_eq!(snapshot.live.generated_at, now());
    }
}
