use crate::routes::{ApiError, parse_body};
use crate::state::AppState;

use translate_core::classifier::ClassifiedError;
use translate_core::models::ModelDescriptor;
use translate_core::upstream::UpstreamCredentials;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, rename = "baseURL")]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
    /// Why the fallback list is being shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub uses_fallback: bool,
}

/// `POST /api/models`
///
/// Always 200 once a key is present: upstream problems come back as the
/// fallback catalog plus an `error` note.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ModelsResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let request: ModelsRequest = parse_body(&body, request_id)?;

    let credentials = UpstreamCredentials::new(
        request.api_key.as_deref().unwrap_or_default(),
        request.base_url.as_deref(),
    );

    if credentials.api_key().is_none() {
        warn!("[{request_id}] Model listing requested without an API key");
        return Err(ClassifiedError::missing_credential().into());
    }

    info!("[{request_id}] Listing models");
    let listing = state.catalog.list_models(&credentials).await;

    let uses_fallback = listing.uses_fallback();
    if let Some(ref error) = listing.error {
        warn!("[{request_id}] Serving fallback catalog ({:?})", error.kind);
    }

    Ok(Json(ModelsResponse {
        models: listing.models,
        error: listing.error.map(|error| error.message),
        uses_fallback,
    }))
}
