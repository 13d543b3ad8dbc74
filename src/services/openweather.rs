//! OpenWeatherMap 5-day / 3-hour forecast client.
//!
//! Only used as a best-effort probe ahead of forecast simulation: the
//! response is checked for shape and counted, never turned into forecast
//! data. See: https://openweathermap.org/forecast5

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::errors::AppError;

/// Client for the OpenWeatherMap forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    user_agent: String,
}

/// What a successful probe saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Number of 3-hour entries in the `list` array.
    pub entry_count: usize,
    /// City name echoed back by the upstream, when present.
    pub city: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, user_agent: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Request the forecast for a location and summarise the response.
    pub async fn probe_forecast(&self, lat: f64, lon: f64) -> Result<ProbeResponse, AppError> {
        let url = format!("{}/forecast", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AppError::InternalError(format!("Invalid User-Agent: {}", e)))?,
        );

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&[
                ("lat", format!("{:.4}", lat)),
                ("lon", format!("{:.4}", lon)),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("forecast request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "forecast endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("forecast JSON parse error: {}", e))
        })?;

        summarise_forecast_body(&body)
    }
}

/// Check that a forecast body has the expected shape.
fn summarise_forecast_body(body: &serde_json::Value) -> Result<ProbeResponse, AppError> {
    let entries = body.get("list").and_then(|l| l.as_array()).ok_or_else(|| {
        AppError::ExternalServiceError("forecast response has no 'list' array".to_string())
    })?;

    let city = body
        .get("city")
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .map(|s| s.to_string());

    Ok(ProbeResponse {
        entry_count: entries.len(),
        city,
    })
}
