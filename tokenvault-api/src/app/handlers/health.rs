use axum::http::Uri;
use axum::Json;
use serde_json::json;

use super::super::error::ApiError;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Fallback for unknown routes; logged so probing shows up in the server log.
pub async fn handler_404(uri: Uri) -> ApiError {
    tracing::warn!(path = %uri.path(), "unknown route requested");
    ApiError::not_found("the requested resource does not exist")
}
