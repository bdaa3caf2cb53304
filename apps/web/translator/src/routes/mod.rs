//! Local HTTP surface consumed by the browser UI.
//!
//! - `POST /api/models`
//! - `POST /api/translate`
//! - `POST /api/ocr`
//! - `GET /health`
//!
//! Failures answer with `{ "error": "<message>" }` and a 4xx/5xx status.

pub mod models;
pub mod ocr;
pub mod translate;

use crate::state::AppState;

use translate_core::classifier::ClassifiedError;
use translate_core::error::OcrError;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

pub const HEALTH_PATH: &str = "/health";
pub const MODELS_ROUTE: &str = "/api/models";
pub const TRANSLATE_ROUTE: &str = "/api/translate";
pub const OCR_ROUTE: &str = "/api/ocr";

// Room for the JSON envelope around a base64 image.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = body_limit(state.max_image_bytes);

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route(MODELS_ROUTE, post(models::list_models))
        .route(TRANSLATE_ROUTE, post(translate::translate))
        .route(OCR_ROUTE, post(ocr::recognize))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Request body limit that fits a base64-encoded image of `max_image_bytes`.
pub fn body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_OVERHEAD_BYTES)
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request: status plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ClassifiedError> for ApiError {
    fn from(error: ClassifiedError) -> Self {
        let status = StatusCode::from_u16(error.kind.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, error.message)
    }
}

impl From<OcrError> for ApiError {
    fn from(error: OcrError) -> Self {
        let status = if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(error, OcrError::Spawn { .. }) {
            // Engine not installed
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, error.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Parse a JSON request body regardless of its `Content-Type`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8], request_id: Uuid) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("[{request_id}] Rejected malformed request body: {e}");
        ApiError::bad_request(format!("Invalid request body: {e}"))
    })
}
