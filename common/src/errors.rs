use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy for the weather fetch path.
///
/// Every variant except `Internal` carries a stable, client-safe message and
/// maps to a 400 response. `Internal` keeps its detail server-side and the
/// client only ever sees a generic 500.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("API key not configured")]
    ApiKeyMissing,

    #[error("Request timed out. Please try again.")]
    Timeout,

    #[error("Failed to fetch weather data")]
    Transport,

    #[error("{0}")]
    Upstream(String),

    #[error("Error processing weather data")]
    DataFormat,

    #[error("An unexpected error occurred")]
    Internal(String),
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    error: String,
}

impl WeatherError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = match &self {
            WeatherError::Internal(detail) => {
                error!(detail = %detail, "Unexpected failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };

        let body = Json(FailureBody {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
