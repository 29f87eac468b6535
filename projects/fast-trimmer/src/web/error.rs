use crate::trim::TrimError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Client-facing failure rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<TrimError> for ApiError {
    fn from(err: TrimError) -> Self {
        let status = match err {
            TrimError::UnknownSource | TrimError::InvalidCoordinates | TrimError::NoMatch(_) => {
                StatusCode::BAD_REQUEST
            }
            TrimError::CoordinateLog { .. }
            | TrimError::Timeout
            | TrimError::Encoder(_)
            | TrimError::SourceMissing(_)
            | TrimError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Trim failed: {}", err);
        } else {
            tracing::info!("Trim rejected: {}", err);
        }

        Self::new(status, err.to_string())
    }
}
