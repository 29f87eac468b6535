use crate::sources::SourceStatus;
use crate::trim::matcher::LatLon;
use crate::trim::{locate_window, TrimError};
use crate::web::error::ApiError;
use crate::web::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode, Uri},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Body of `POST /trim`. Fields stay loosely typed so each kind of bad input
/// maps to its own error.
#[derive(Debug, Default, Deserialize)]
pub struct TrimRequest {
    pub source: Option<Value>,
    pub start_lat: Option<Value>,
    pub start_lon: Option<Value>,
    pub end_lat: Option<Value>,
    pub end_lon: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrimResponse {
    pub video_url: String,
}

impl TrimRequest {
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(Value::as_str)
    }

    /// Start and end positions, or `None` if any coordinate is missing or not numeric.
    pub fn positions(&self) -> Option<(LatLon, LatLon)> {
        let start = LatLon::new(
            parse_coordinate(self.start_lat.as_ref())?,
            parse_coordinate(self.start_lon.as_ref())?,
        );
        let end = LatLon::new(
            parse_coordinate(self.end_lat.as_ref())?,
            parse_coordinate(self.end_lon.as_ref())?,
        );
        Some((start, end))
    }
}

/// Accepts JSON numbers and numeric strings.
fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Host for the returned URL: the `Host` header, else the request-target
/// authority. Forwarding headers are client-controlled and never consulted.
fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| "localhost".to_string())
}

pub async fn trim_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    payload: Result<Json<TrimRequest>, JsonRejection>,
) -> Result<Json<TrimResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text()))?;

    let host = request_host(&headers, &uri);
    let response = trim_video(&state, &host, request).await?;
    Ok(Json(response))
}

async fn trim_video(
    state: &AppState,
    host: &str,
    request: TrimRequest,
) -> Result<TrimResponse, TrimError> {
    let source_name = request.source_name().ok_or(TrimError::UnknownSource)?;
    let source = state
        .sources
        .get(source_name)
        .ok_or(TrimError::UnknownSource)?
        .clone();
    let (start, end) = request.positions().ok_or(TrimError::InvalidCoordinates)?;

    let coordinates_file = source.coordinates_file.clone();
    let window = tokio::task::spawn_blocking(move || locate_window(&coordinates_file, start, end))
        .await
        .map_err(|e| TrimError::Internal(e.to_string()))??;

    tracing::info!(
        "Source {}: matched window {:.2}s..{:.2}s",
        source_name,
        window.start,
        window.end
    );

    let (filename, output) = state.store.allocate();
    state
        .executor
        .trim(&source.video_file, window, &output)
        .await?;

    Ok(TrimResponse {
        video_url: state.public_url.video_url(host, &filename),
    })
}

/// Configured sources and whether their videos are present.
pub async fn get_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceStatus>> {
    Json(state.sources.status())
}
