use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use axum_extra::extract::Query;
use common::models::{WeatherReport, WeatherResponse};
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tracing::info;

use crate::api_client::OpenWeatherClient;
use crate::cache::WindowClock;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<OpenWeatherClient>,
    pub windows: WindowClock,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: String,
}

/// Landing page, embedded at compile time.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weathercast" }))
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("city" = String, Query, description = "City name")
    ),
    responses(
        (status = 200, description = "Current weather for the city", body = WeatherResponse),
        (status = 400, description = "Missing city or upstream failure"),
        (status = 500, description = "Internal server error")
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Response {
    let city = params.city.trim();
    if city.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Please enter a city name" })),
        )
            .into_response();
    }

    info!(city = %city, "Weather request received");

    let window = state.windows.current();
    match state.client.get_weather(city, window).await {
        Ok(report) => Json(success_body(city, report)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn success_body(city: &str, report: WeatherReport) -> WeatherResponse {
    WeatherResponse {
        success: true,
        data: report,
        openweather_url: format!("https://zoom.earth?q={}", urlencoding::encode(city)),
    }
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Resource not found" })),
    )
        .into_response()
}

/// Responder for `CatchPanicLayer`; the panic payload stays server-side.
pub fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::WeatherCache;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use axum::{Router, routing::get};
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(upstream_url: String, api_key: Option<&str>) -> Router {
        let cache = Arc::new(WeatherCache::with_capacity(100));
        let client = Arc::new(OpenWeatherClient::new(
            cache,
            upstream_url,
            api_key.map(str::to_string),
            Duration::from_millis(500),
        ));
        let state = AppState {
            client,
            windows: WindowClock::new(300),
        };
        Router::new()
            .route("/api/weather", get(get_weather))
            .fallback(not_found)
            .with_state(state)
    }

    async fn request(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .expect("Router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, serde_json::from_slice(&bytes).expect("Body was not JSON"))
    }

    #[tokio::test]
    async fn blank_city_is_rejected_without_an_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for uri in ["/api/weather", "/api/weather?city=", "/api/weather?city=%20%20"] {
            let (status, body) = request(app(server.uri(), Some("test-key")), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Please enter a city name" }));
        }
    }

    #[tokio::test]
    async fn successful_lookup_returns_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": 200,
                "main": { "temp": 21.34, "feels_like": 20.9, "humidity": 55 },
                "weather": [ { "description": "clear sky", "icon": "01d" } ]
            })))
            .mount(&server)
            .await;

        let (status, body) =
            request(app(server.uri(), Some("test-key")), "/api/weather?city=New%20York").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["temperature"], 21.3);
        assert_eq!(body["data"]["feels_like"], 20.9);
        assert_eq!(body["data"]["humidity"], 55);
        assert_eq!(body["data"]["description"], "clear sky");
        assert_eq!(body["data"]["icon"], "01d");
        assert_eq!(body["openweather_url"], "https://zoom.earth?q=New%20York");
    }

    #[tokio::test]
    async fn upstream_timeout_surfaces_the_timeout_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let (status, body) =
            request(app(server.uri(), Some("test-key")), "/api/weather?city=London").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Request timed out. Please try again." })
        );
    }

    #[tokio::test]
    async fn missing_api_key_is_reported_without_an_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, body) = request(app(server.uri(), None), "/api/weather?city=London").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "error": "API key not configured" })
        );
    }

    #[tokio::test]
    async fn unknown_routes_fall_back_to_404() {
        let server = MockServer::start().await;
        let (status, body) = request(app(server.uri(), Some("test-key")), "/api/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Resource not found" }));
    }
}
