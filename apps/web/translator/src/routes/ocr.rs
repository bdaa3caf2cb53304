use crate::routes::{ApiError, parse_body};
use crate::state::AppState;

use translate_core::ocr::{Recognition, decode_image_data};

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use log::{debug, info, warn};
use serde::Deserialize;
use uuid::Uuid;

const OCR_DISABLED_MESSAGE: &str = "OCR is not available on this server";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// `POST /api/ocr`
pub async fn recognize(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Recognition>, ApiError> {
    let request_id = Uuid::new_v4();

    let Some(engine) = state.ocr.as_ref() else {
        warn!("[{request_id}] OCR requested while disabled");
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, OCR_DISABLED_MESSAGE));
    };

    let request: OcrRequest = parse_body(&body, request_id)?;

    let image = decode_image_data(request.image_data.as_deref().unwrap_or_default())?;
    if image.len() > state.max_image_bytes {
        warn!("[{request_id}] Image of {} bytes rejected", image.len());
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Image exceeds {} bytes", state.max_image_bytes),
        ));
    }

    let language = request
        .language
        .as_deref()
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .unwrap_or(state.ocr_language.as_str());

    debug!("[{request_id}] OCR on {} bytes (language: {language})", image.len());

    let recognition = engine.recognize(&image, language).await.map_err(|e| {
        warn!("[{request_id}] OCR failed: {e}");
        ApiError::from(e)
    })?;

    info!(
        "[{request_id}] OCR recognized {} chars at confidence {}",
        recognition.text.chars().count(),
        recognition.confidence
    );

    Ok(Json(recognition))
}
