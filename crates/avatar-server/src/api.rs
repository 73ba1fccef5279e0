//! API handlers for the avatar server.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use avatar_types::ResponseBundle;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Request body for `POST /chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Absent, empty and whitespace-only are equivalent.
    #[serde(default)]
    pub message: Option<String>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /`.
pub async fn root_handler() -> &'static str {
    "Hello World!"
}

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `GET /voices`.
///
/// Passes the synthesizer's voice catalog through unchanged.
pub async fn voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("no synthesizer configured".to_string()))?;

    let catalog = synthesizer.voices().await.map_err(|e| {
        tracing::error!("voice catalog request failed: {}", e);
        ApiError::InternalServerError(e.to_string())
    })?;
    Ok(Json(catalog))
}

/// Reads the chat body.
///
/// A missing body or a non-JSON content type carries no message. Only a JSON
/// body that fails to decode is rejected.
fn parse_chat_request(headers: &HeaderMap, body: &[u8]) -> Result<ChatRequest, ApiError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false);

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Handler for `POST /chat`.
///
/// Pipeline failures are logged by the service and surface here as a generic
/// server fault; no partial bundle is ever returned.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ResponseBundle>, ApiError> {
    let payload = parse_chat_request(&headers, &body)?;

    state
        .responder
        .handle(payload.message.as_deref())
        .await
        .map(Json)
        .map_err(|_| ApiError::InternalServerError("Internal Server Error".to_string()))
}
