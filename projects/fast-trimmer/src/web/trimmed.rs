use crate::web::error::ApiError;
use crate::web::AppState;
use axum::{
    extract::{Path, Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
    pub message: String,
}

/// Stream a produced video. Range requests are answered with partial content.
pub async fn serve_video_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = state
        .store
        .resolve(&filename)
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    Ok(response.into_response())
}

pub async fn count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .store
        .count()
        .map_err(|e| ApiError::internal(format!("Error counting videos: {}", e)))?;

    Ok(Json(CountResponse { count }))
}

pub async fn delete_all_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let deleted = state
        .store
        .delete_all()
        .map_err(|e| ApiError::internal(format!("Error deleting videos: {}", e)))?;

    tracing::info!("Deleted {} trimmed videos", deleted);

    Ok(Json(DeleteAllResponse {
        deleted,
        message: format!("Deleted {} videos", deleted),
    }))
}
