//! End-to-end tests for the HTTP API using warp's test client.
//!
//! The live provider is a wiremock server and placeholder files live in a
//! temporary directory, so every test controls both sources and the clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{DateTime, Duration, Utc};
use fete_core::{EventConfig, WeatherConfig};
use fete_server::{routes, AccessGate, AppState, ErrorResponse, WeatherResponse};
use fete_weather::{
    EventWindow, FixedClock, PlaceholderStore, Source, WeatherCache, WeatherProvider,
    WeatherService,
};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "wedding-weather";

struct TestApp {
    dir: tempfile::TempDir,
    state: AppState,
}

impl TestApp {
    fn cache(&self) -> WeatherCache {
        WeatherCache::open(self.dir.path().join("cache").join("weather-cache.db")).unwrap()
    }
}

fn write_placeholder(dir: &Path, date: &str, text: &str, high: f64, low: f64) {
    let body = serde_json::json!({
        "forecast": {
            "forecastday": [{
                "date": date,
                "day": { "maxtemp_f": high, "mintemp_f": low, "condition": { "text": text } }
            }]
        }
    });
    std::fs::write(dir.join(format!("{}-weather.json", date)), body.to_string()).unwrap();
}

fn event_start() -> DateTime<Utc> {
    EventConfig::default().start.with_timezone(&Utc)
}

fn app(provider_url: &str, now: DateTime<Utc>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir(&data_dir).unwrap();
    write_placeholder(&data_dir, "2025-10-31", "Sunny", 84.4, 60.6);
    write_placeholder(&data_dir, "2025-11-01", "Partly cloudy", 79.5, 58.2);
    write_placeholder(&data_dir, "2025-11-02", "Patchy rain nearby", 71.0, 57.0);

    let event = EventConfig::default();
    let weather = WeatherConfig {
        base_url: provider_url.to_string(),
        ..WeatherConfig::default()
    };

    let service = WeatherService::new(
        EventWindow::from_config(&event),
        WeatherProvider::new(&weather, "test-key", *event.start.offset()).unwrap(),
        PlaceholderStore::new(&data_dir, event.dates.clone()),
        WeatherCache::open(dir.path().join("cache").join("weather-cache.db")).unwrap(),
        KEY,
        Duration::hours(24),
    )
    .with_clock(Arc::new(FixedClock(now)));

    let state = AppState {
        weather: Arc::new(service),
        gate: Arc::new(AccessGate::default()),
        static_dir: None,
    };

    TestApp { dir, state }
}

#[tokio::test]
async fn test_placeholder_forecast_far_from_event() {
    let mock_server = MockServer::start().await;
    let app = app(&mock_server.uri(), event_start() - Duration::days(20));
    let filter = routes(app.state.clone());

    let res = warp::test::request()
        .method("GET")
        .path("/api/weather")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), 200);
    let body: WeatherResponse = serde_json::from_slice(res.body()).unwrap();
    assert!(body.success);
    assert!(!body.cached);
    assert_eq!(body.source, Source::Placeholder);
    assert_eq!(body.data.len(), 3);
    assert_eq!(body.data[0].date, "Oct 31");
    assert!(body.data.iter().all(|d| d.temp_high >= d.temp_low));
    assert!(body.data.iter().all(|d| d.source == Source::Placeholder));

    let raw: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(raw["source"], "placeholder");
    assert_eq!(raw["data"][1]["main"], "Clouds");
    assert_eq!(raw["data"][2]["main"], "Rain");
}

#[tokio::test]
async fn test_second_request_served_from_cache() {
    let mock_server = MockServer::start().await;
    let app = app(&mock_server.uri(), event_start() - Duration::days(20));
    let filter = routes(app.state.clone());

    let first = warp::test::request().path("/api/weather").reply(&filter).await;
    let second = warp::test::request().path("/api/weather").reply(&filter).await;

    let first: WeatherResponse = serde_json::from_slice(first.body()).unwrap();
    let second: WeatherResponse = serde_json::from_slice(second.body()).unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.source, Source::Placeholder);
    assert_eq!(second.data, first.data);
}

#[tokio::test]
async fn test_live_forecast_near_event() {
    let mock_server = MockServer::start().await;
    let start = EventConfig::default().start.timestamp();
    let list: Vec<_> = (0..16)
        .map(|i: i64| {
            serde_json::json!({
                "dt": start + i * 3 * 3600,
                "main": { "temp": 70.4 - i as f64 * 0.5 },
                "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }]
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "list": list })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = app(&mock_server.uri(), event_start() - Duration::days(5));
    let filter = routes(app.state.clone());

    let res = warp::test::request().path("/api/weather").reply(&filter).await;

    assert_eq!(res.status(), 200);
    let body: WeatherResponse = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body.source, Source::Live);
    // 16 three-hour samples cover two local days
    assert_eq!(body.data.len(), 2);
    assert_eq!(body.data[0].temp_high, 70);
    assert_eq!(body.data[0].temp_low, 67);
}

#[tokio::test]
async fn test_malformed_provider_body_is_500_and_not_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"list\": [{\"dt\": \"soon\"}]}"))
        .mount(&mock_server)
        .await;

    let app = app(&mock_server.uri(), event_start() - Duration::days(2));
    let filter = routes(app.state.clone());

    let res = warp::test::request().path("/api/weather").reply(&filter).await;

    assert_eq!(res.status(), 500);
    let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
    assert!(!body.success);
    assert!(!body.error.is_empty());
    assert!(app.cache().is_empty().unwrap());
}

#[tokio::test]
async fn test_provider_error_message_is_returned() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let app = app(&mock_server.uri(), event_start() - Duration::days(1));
    let filter = routes(app.state.clone());

    let res = warp::test::request().path("/api/weather").reply(&filter).await;

    assert_eq!(res.status(), 500);
    let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body.error, "API Error: Invalid API key");
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let mock_server = MockServer::start().await;
    let app = app(&mock_server.uri(), event_start() - Duration::days(20));
    let filter = routes(app.state.clone());

    let res = warp::test::request().path("/api/nope").reply(&filter).await;

    assert_eq!(res.status(), 404);
    let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
    assert!(!body.success);
}

#[tokio::test]
async fn test_health_through_full_router() {
    let mock_server = MockServer::start().await;
    let app = app(&mock_server.uri(), event_start() - Duration::days(20));
    let filter = routes(app.state.clone());

    let res = warp::test::request().path("/health").reply(&filter).await;

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cors_header_on_api() {
    let mock_server = MockServer::start().await;
    let app = app(&mock_server.uri(), event_start() - Duration::days(20));
    let filter = routes(app.state.clone());

    let res = warp::test::request()
        .path("/api/weather")
        .header("origin", "https://party.example.com")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("access-control-allow-origin"));
}
