use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gambit_core::room::RoomIdError;

use crate::room_manager::RoomError;

/// Failure of an HTTP request, rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// Capacity limits, or a room actor that went away mid-request.
    Unavailable(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Unavailable(m) => write!(f, "{m}"),
        }
    }
}

impl From<RoomIdError> for AppError {
    fn from(e: RoomIdError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<RoomError> for AppError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::Full => Self::Unavailable(e.to_string()),
            RoomError::Unsupported(_) | RoomError::InvalidId(_) => Self::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "Request refused");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
