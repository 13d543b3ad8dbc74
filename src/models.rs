use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// A state tracked for rainfall and water-level readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Region {
    #[serde(rename = "Maharashtra")]
    Maharashtra,
    #[serde(rename = "Kerala")]
    Kerala,
    #[serde(rename = "Rajasthan")]
    Rajasthan,
    #[serde(rename = "West Bengal")]
    WestBengal,
    #[serde(rename = "Tamil Nadu")]
    TamilNadu,
    #[serde(rename = "Uttar Pradesh")]
    UttarPradesh,
}

impl Region {
    /// All tracked regions, in display order.
    pub const ALL: [Region; 6] = [
        Region::Maharashtra,
        Region::Kerala,
        Region::Rajasthan,
        Region::WestBengal,
        Region::TamilNadu,
        Region::UttarPradesh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Maharashtra => "Maharashtra",
            Region::Kerala => "Kerala",
            Region::Rajasthan => "Rajasthan",
            Region::WestBengal => "West Bengal",
            Region::TamilNadu => "Tamil Nadu",
            Region::UttarPradesh => "Uttar Pradesh",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = String;

    /// Case-insensitive; accepts "West Bengal", "west bengal" and "west-bengal".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Region::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("Unknown region '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    Normal,
    Alert,
}

/// Live readings for one region, replaced wholesale on every tick.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegionSnapshot {
    pub name: Region,
    pub rainfall_mm: f64,
    pub water_level_pct: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub status: RegionStatus,
    pub last_updated: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourlyRainfallPoint {
    /// Hour of day, 0..=23
    pub hour: u8,
    /// "H:00", e.g. "7:00"
    pub hour_label: String,
    pub rainfall_mm: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyWaterPoint {
    /// "Mon" through "Sun"
    pub day_label: String,
    pub level_pct: f64,
    pub capacity_pct: f64,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HeavyRainfall,
    LowWaterLevel,
    WeatherAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    High,
    Medium,
}

/// An alert raised for a region whose status is `alert`.
///
/// IDs are random v4 UUIDs; collisions across ticks are negligible
/// (122 random bits), so consumers may key on `id` safely.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Alert {
    pub id: Uuid,
    pub region: Region,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub reported_at: DateTime<Utc>,
}

/// Process-wide weather summary card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WeatherSummary {
    pub temperature_c: i32,
    pub humidity_pct: i32,
    pub wind_speed_kph: i32,
    pub pressure_hpa: i32,
}

// ---------------------------------------------------------------------------
// City forecasts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Monsoon,
    Winter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    Sun,
    Cloud,
    CloudRain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RainRisk {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentConditions {
    pub temperature_c: i32,
    pub humidity_pct: i32,
    pub wind_speed_kph: i32,
    pub pressure_hpa: i32,
    pub description: String,
    pub icon: WeatherIcon,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// e.g. "Thu, 17 Oct"
    pub date_label: String,
    /// e.g. "Thu"
    pub weekday_label: String,
    /// Days after generation, 1..=7
    pub day_offset: u8,
    pub max_temp_c: i32,
    pub min_temp_c: i32,
    pub humidity_pct: i32,
    pub rain_chance_pct: i32,
    /// Expected rainfall, one decimal place
    pub rain_amount_mm: f64,
    pub wind_speed_kph: i32,
    pub description: String,
    pub icon: WeatherIcon,
    pub rain_risk: RainRisk,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CityForecast {
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub season: Season,
    /// Seasonal baseline rainfall drawn for this city (1 dp)
    pub seasonal_rain_mm: f64,
    pub current: CurrentConditions,
    /// Always 7 entries, ordered by `day_offset`
    pub forecast: Vec<ForecastDay>,
}

// ---------------------------------------------------------------------------
// Published snapshot
// ---------------------------------------------------------------------------

/// Everything the presentation layer reads, published at the end of a tick.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub regions: Vec<RegionSnapshot>,
    pub hourly_rainfall: Vec<HourlyRainfallPoint>,
    pub weekly_water: Vec<WeeklyWaterPoint>,
    pub weather: WeatherSummary,
    pub alerts: Vec<Alert>,
    pub forecasts: Vec<CityForecast>,
    /// When regions, alerts and weather were last regenerated
    pub regions_updated_at: DateTime<Utc>,
    /// When the whole snapshot was last replaced
    pub full_refresh_at: DateTime<Utc>,
}
