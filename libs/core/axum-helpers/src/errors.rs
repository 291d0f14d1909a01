use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Minimal JSON error body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handler for 404 Not Found errors.
///
/// This can be used as a fallback handler in your router.
pub async fn not_found() -> Response {
    let body = Json(MessageResponse {
        message: "Not found".to_string(),
    });

    (StatusCode::NOT_FOUND, body).into_response()
}
