use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FAST_REFRESH_SECS: u64 = 5;
const DEFAULT_FULL_REFRESH_SECS: u64 = 30 * 60;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_USER_AGENT: &str = "RainfallMonitor/0.1";

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Interval of the fast cycle (regions, alerts, weather summary).
    pub fast_refresh: Duration,
    /// Interval of the full cycle (everything, including city forecasts).
    pub full_refresh: Duration,
    pub weather_api_url: String,
    /// Upstream forecast probe is skipped when no key is configured.
    pub weather_api_key: Option<String>,
    pub weather_user_agent: String,
    pub probe_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", DEFAULT_PORT),
            fast_refresh: interval_secs("FAST_REFRESH_SECS", DEFAULT_FAST_REFRESH_SECS),
            full_refresh: interval_secs("FULL_REFRESH_SECS", DEFAULT_FULL_REFRESH_SECS),
            weather_api_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
            weather_api_key: std::env::var("WEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            weather_user_agent: std::env::var("WEATHER_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            probe_timeout: interval_secs("WEATHER_PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Interval in whole seconds; zero is raised to one second.
fn interval_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(env_or(key, default).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // NOTE: set_var/remove_var mutate process-wide state; this is the only
        // test in the binary touching these variables.
        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("FAST_REFRESH_SECS");
            std::env::remove_var("FULL_REFRESH_SECS");
            std::env::remove_var("WEATHER_API_URL");
            std::env::set_var("WEATHER_API_KEY", "   ");
            std::env::remove_var("WEATHER_USER_AGENT");
            std::env::set_var("WEATHER_PROBE_TIMEOUT_SECS", "0");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.fast_refresh, Duration::from_secs(5));
        assert_eq!(config.full_refresh, Duration::from_secs(1800));
        assert!(config.weather_api_url.contains("openweathermap"));
        assert_eq!(config.weather_api_key, None, "Blank key disables the probe");
        assert!(config.weather_user_agent.contains("RainfallMonitor"));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_env_or_malformed_falls_back() {
        unsafe {
            std::env::set_var("RAINFALL_TEST_MALFORMED_U16", "not-a-port");
        }
        assert_eq!(env_or("RAINFALL_TEST_MALFORMED_U16", 42u16), 42);
    }
}
