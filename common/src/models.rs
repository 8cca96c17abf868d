use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalized current-weather snapshot returned to clients.
///
/// Temperatures are metric, rounded to one decimal. The timestamp records
/// the wall-clock time of the upstream fetch, `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct WeatherReport {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub description: String,
    pub icon: String,
    pub timestamp: String,
}

/// Success envelope for `/api/weather`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherResponse {
    pub success: bool,
    pub data: WeatherReport,
    /// Attribution link for the looked-up city.
    pub openweather_url: String,
}
