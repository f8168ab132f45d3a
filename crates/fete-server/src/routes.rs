//! HTTP routes: forecast API, health check, password gate and static files.

use chrono::{SecondsFormat, Utc};
use fete_weather::{ForecastDay, Source, WeatherService};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::gate::{AccessGate, GateOutcome};

const MAX_GATE_BODY_BYTES: u64 = 4 * 1024;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub gate: Arc<AccessGate>,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub success: bool,
    pub data: Vec<ForecastDay>,
    pub cached: bool,
    pub source: Source,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct GateRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GateResponse {
    pub success: bool,
    pub token: String,
}

/// All routes, with CORS for any origin and JSON error bodies.
///
/// Each route matches its path before its method so an unknown path is a
/// 404 rather than a 405 from whichever route was tried last.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["content-type"]);

    weather_route(state.weather)
        .or(health_route())
        .or(gate_route(state.gate))
        .or(static_route(state.static_dir))
        .with(cors)
        .recover(handle_rejection)
}

fn weather_route(
    service: Arc<WeatherService>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "weather")
        .and(warp::get())
        .and(warp::any().map(move || service.clone()))
        .and_then(get_weather)
}

fn health_route() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(health)
}

fn gate_route(
    gate: Arc<AccessGate>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "gate")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_GATE_BODY_BYTES))
        .and(warp::body::json())
        .and(warp::any().map(move || gate.clone()))
        .map(check_gate)
}

fn static_route(dir: Option<PathBuf>) -> BoxedFilter<(warp::fs::File,)> {
    match dir {
        Some(dir) => warp::get().and(warp::fs::dir(dir)).boxed(),
        None => warp::any()
            .and_then(|| async { Err::<warp::fs::File, Rejection>(warp::reject::not_found()) })
            .boxed(),
    }
}

async fn get_weather(service: Arc<WeatherService>) -> Result<Response, Infallible> {
    match service.forecast().await {
        Ok(forecast) => Ok(json_response(
            &WeatherResponse {
                success: true,
                data: forecast.days,
                cached: forecast.cached,
                source: forecast.source,
            },
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("Error fetching weather: {}", e);
            Ok(json_response(
                &ErrorResponse::new(e.to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

fn health() -> Response {
    json_response(
        &HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        StatusCode::OK,
    )
}

fn check_gate(request: GateRequest, gate: Arc<AccessGate>) -> Response {
    match gate.check(&request.password) {
        GateOutcome::Granted { token } => json_response(
            &GateResponse {
                success: true,
                token,
            },
            StatusCode::OK,
        ),
        GateOutcome::Denied => json_response(
            &ErrorResponse::new("Incorrect password"),
            StatusCode::UNAUTHORIZED,
        ),
        GateOutcome::Disabled => json_response(
            &ErrorResponse::new("Password gate is not configured"),
            StatusCode::NOT_FOUND,
        ),
    }
}

fn json_response<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(e) = err.find::<warp::filters::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(json_response(&ErrorResponse::new(message), status))
}
