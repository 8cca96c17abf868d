use crate::cache::{CacheKey, WeatherCache};
use chrono::Local;
use common::errors::WeatherError;
use common::models::WeatherReport;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct OpenWeatherPayload {
    main: MainReadings,
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: String,
    icon: String,
}

/// Lenient view of the provider's status envelope. OpenWeatherMap reports
/// `cod` as a number on success and a string on errors.
#[derive(Debug, Default, Deserialize)]
struct ProviderStatus {
    #[serde(default)]
    cod: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ProviderStatus {
    fn is_success(&self) -> bool {
        match &self.cod {
            None => true,
            Some(cod) => cod.as_i64() == Some(200) || cod.as_str() == Some("200"),
        }
    }
}

pub struct OpenWeatherClient {
    http: Client,
    cache: Arc<WeatherCache>,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(
        cache: Arc<WeatherCache>,
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            cache,
            base_url,
            api_key,
        }
    }

    /// Cache-through lookup for one freshness window.
    ///
    /// A hit returns the stored report without touching the network; a miss
    /// fetches and stores on success only, so failing cities are re-attempted
    /// on every request.
    #[instrument(skip(self), fields(city = %city, window = window))]
    pub async fn get_weather(&self, city: &str, window: u64) -> Result<WeatherReport, WeatherError> {
        let key = CacheKey::new(city, window);
        if let Some(cached) = self.cache.get(&key).await {
            info!(city = %city, window, "Cache hit");
            return Ok(cached);
        }

        info!(city = %city, "Fetching weather from OpenWeatherMap");
        let report = self.fetch(city).await?;
        self.cache.insert(key, report.clone()).await;

        Ok(report)
    }

    /// Single upstream call, no retries.
    pub async fn fetch(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::ApiKeyMissing)?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Timeout
                } else {
                    error!(city = %city, error = %e, "Upstream request failed");
                    WeatherError::Transport
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                WeatherError::Timeout
            } else {
                error!(city = %city, error = %e, "Failed reading upstream response");
                WeatherError::Transport
            }
        })?;

        // Any outcome the provider itself reported is a logical error, with
        // its message passed through to the client.
        let provider_status: ProviderStatus = serde_json::from_str(&body).unwrap_or_default();
        if !status.is_success() || !provider_status.is_success() {
            let message = provider_status
                .message
                .unwrap_or_else(|| "City not found".to_string());
            warn!(city = %city, status = %status, message = %message, "Provider reported failure");
            return Err(WeatherError::upstream(message));
        }

        let payload: OpenWeatherPayload = serde_json::from_str(&body).map_err(|e| {
            error!(city = %city, error = %e, "Unexpected upstream payload");
            WeatherError::DataFormat
        })?;
        let conditions = payload.weather.first().ok_or_else(|| {
            error!(city = %city, "Upstream payload carried no weather conditions");
            WeatherError::DataFormat
        })?;

        Ok(WeatherReport {
            temperature: round_tenths(payload.main.temp),
            feels_like: round_tenths(payload.main.feels_like),
            humidity: payload.main.humidity,
            description: conditions.description.clone(),
            icon: conditions.icon.clone(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
