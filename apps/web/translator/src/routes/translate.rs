use crate::routes::{ApiError, parse_body};
use crate::state::AppState;

use translate_core::translation::{TranslationRequest, TranslationResult};
use translate_core::upstream::UpstreamCredentials;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, rename = "baseURL")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl TranslateRequest {
    fn into_parts(self) -> (TranslationRequest, UpstreamCredentials) {
        let credentials = UpstreamCredentials::new(
            self.api_key.as_deref().unwrap_or_default(),
            self.base_url.as_deref(),
        );
        let request = TranslationRequest {
            text: self.text.unwrap_or_default(),
            source_lang: self.source_lang.unwrap_or_default(),
            target_lang: self.target_lang.unwrap_or_default(),
            model: self.model,
        };
        (request, credentials)
    }
}

/// `POST /api/translate`
pub async fn translate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranslationResult>, ApiError> {
    let request_id = Uuid::new_v4();
    let (request, credentials) = parse_body::<TranslateRequest>(&body, request_id)?.into_parts();

    info!(
        "[{request_id}] Translate request: {} -> {}",
        request.source_lang, request.target_lang
    );

    match state.translator.translate(&request, &credentials).await {
        Ok(result) => {
            info!(
                "[{request_id}] Translated into {} chars",
                result.translated_text.chars().count()
            );
            Ok(Json(result))
        }
        Err(error) => {
            warn!("[{request_id}] Translate failed ({:?}): {error}", error.kind);
            Err(error.into())
        }
    }
}
