use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use relevo_core::RelayError;

/// Errors surfaced by the JSON API handlers.
///
/// The pipeline only lets fallback exhaustion escape, and the upstream is
/// the party that failed, so everything maps to 502.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("relay pipeline failed: {0}")]
    Relay(#[from] RelayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Relay(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
