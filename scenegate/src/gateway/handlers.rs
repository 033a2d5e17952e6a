//! Request handlers and response helpers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::task::{self, JoinError};
use tracing::{debug, error};

use crate::geometry::Point;
use crate::provider::{ProviderError, UpstreamError};

use super::{GatewayState, CACHE_LONG, CACHE_SHORT, DEFAULT_DAYS_AGO};

const MISSING_COORDINATES: &str = "Malformed input: missing 'x' and/or 'y' value";

#[derive(Debug, Serialize)]
pub(super) struct Uptime {
    uptime: f64,
}

/// Raw query string of `GET /scenes`.
///
/// Values are parsed by hand so that malformed numbers produce the same JSON
/// error body as missing ones.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SceneQuery {
    x: Option<String>,
    y: Option<String>,
    days_ago: Option<String>,
}

/// JSON error response, `{"error": message}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

fn cache_control(max_age: u32) -> [(header::HeaderName, String); 1] {
    [(header::CACHE_CONTROL, format!("max-age={max_age}"))]
}

fn cached_json<T: Serialize>(body: T, max_age: u32) -> Response {
    (cache_control(max_age), Json(body)).into_response()
}

fn png(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "image/png")],
        cache_control(CACHE_LONG),
        body,
    )
        .into_response()
}

fn worker_failed(err: JoinError) -> ProviderError {
    UpstreamError::Transport(format!("worker task failed: {err}")).into()
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_days_ago(value: Option<&str>) -> Result<i32, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_DAYS_AGO),
        Some(v) => v
            .parse()
            .map_err(|_| ApiError::bad_request("Malformed input: 'days_ago' must be an integer")),
    }
}

/// Parses the `z`, `x` and `{y}.png` path segments of a tile request.
fn parse_tile_path(z: &str, x: &str, tile: &str) -> Result<(u32, u32, u32), ApiError> {
    let y = tile
        .strip_suffix(".png")
        .ok_or_else(|| ApiError::bad_request("Malformed tile path: expected '{y}.png'"))?;

    let coord = |name: &str, value: &str| {
        value.parse::<u32>().map_err(|_| {
            ApiError::bad_request(format!(
                "Malformed tile path: '{name}' must be a non-negative integer"
            ))
        })
    };

    Ok((coord("z", z)?, coord("x", x)?, coord("y", y)?))
}

pub(super) async fn uptime(State(state): State<GatewayState>) -> Json<Uptime> {
    Json(Uptime {
        uptime: round_millis(state.uptime().as_secs_f64()),
    })
}

pub(super) async fn search_scenes(
    State(state): State<GatewayState>,
    Query(query): Query<SceneQuery>,
) -> Response {
    let x = parse_coordinate(query.x.as_deref());
    let y = parse_coordinate(query.y.as_deref());
    let (Some(x), Some(y)) = (x, y) else {
        return ApiError::bad_request(MISSING_COORDINATES).into_response();
    };
    let days_ago = match parse_days_ago(query.days_ago.as_deref()) {
        Ok(days) => days,
        Err(err) => return err.into_response(),
    };

    debug!(x, y, days_ago, "Scene search");

    let provider = Arc::clone(&state.provider);
    let result = task::spawn_blocking(move || provider.search(Point::new(x, y), days_ago))
        .await
        .unwrap_or_else(|e| Err(worker_failed(e)));

    match result {
        Ok(scenes) => cached_json(scenes, CACHE_SHORT),
        Err(err) => ApiError::internal(format!("Search error: {err}")).into_response(),
    }
}

pub(super) async fn get_scene(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    debug!(scene_id = %id, "Scene lookup");

    let provider = Arc::clone(&state.provider);
    let scene_id = id.clone();
    let result = task::spawn_blocking(move || provider.get_scene(&scene_id))
        .await
        .unwrap_or_else(|e| Err(worker_failed(e)));

    match result {
        Ok(scene) => cached_json(scene, CACHE_LONG),
        Err(ProviderError::NotFound) => {
            ApiError::not_found(format!("Scene '{id}' not found")).into_response()
        }
        Err(err) => ApiError::internal(format!("Scene fetch error: {err}")).into_response(),
    }
}

pub(super) async fn get_tile(
    State(state): State<GatewayState>,
    Path((scene_id, z, x, tile)): Path<(String, String, String, String)>,
) -> Response {
    let (z, x, y) = match parse_tile_path(&z, &x, &tile) {
        Ok(coords) => coords,
        Err(err) => return err.into_response(),
    };

    let provider = Arc::clone(&state.provider);
    let id = scene_id.clone();
    // Drain on the blocking pool so the upstream connection is released
    // before the response is written.
    let result = task::spawn_blocking(move || {
        let stream = provider.fetch_tile(&id, x, y, z)?;
        stream
            .into_bytes()
            .map_err(|e| ProviderError::from(UpstreamError::Transport(e.to_string())))
    })
    .await
    .unwrap_or_else(|e| Err(worker_failed(e)));

    match result {
        Ok(bytes) => png(StatusCode::OK, bytes),
        Err(err) => {
            error!(
                scene_id = %scene_id,
                x,
                y,
                z,
                error = %err,
                "Could not proxy tile request"
            );
            png(StatusCode::INTERNAL_SERVER_ERROR, state.placeholder().to_vec())
        }
    }
}
