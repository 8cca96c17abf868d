use std::env;

pub struct Config {
    pub port: u16,
    pub openweather_url: String,
    pub api_key: Option<String>,
    pub cache_window_seconds: u64,
    pub cache_capacity: usize,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            openweather_url: env::var("OPENWEATHER_URL").unwrap_or_else(|_| {
                "https://api.openweathermap.org/data/2.5/weather".to_string()
            }),
            // Absence is reported when a fetch is attempted, not at boot.
            api_key: env::var("OPENWEATHER_API_KEY").ok(),
            cache_window_seconds: env::var("CACHE_WINDOW_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300), // 5 minute freshness window
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(100),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(5),
        }
    }
}
