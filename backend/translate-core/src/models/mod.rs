//! Model catalog: list the models an upstream endpoint offers.
//!
//! Listing never fails from the caller's point of view. Any problem yields the
//! built-in fallback catalog together with the classified reason.

use crate::classifier::{ClassifiedError, Operation, classify};
use crate::endpoint::{EndpointKind, resolve};
use crate::error::UpstreamError;
use crate::upstream::{BrowserProfile, UpstreamClient, UpstreamCredentials, read_success_body};

use common::RedactedApiKey;

use log::{info, warn};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Model ids offered when the upstream cannot be asked.
pub const FALLBACK_MODEL_IDS: [&str; 4] = ["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview", "gpt-4o"];
pub const FALLBACK_MODEL_OWNER: &str = "openai";

const DEFAULT_MODEL_OBJECT: &str = "model";

/// One selectable upstream model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default = "default_object")]
    pub object: String,
    /// Unix seconds. Floats are truncated, numeric strings parsed, anything else dropped.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, owned_by: Option<&str>) -> Self {
        Self {
            id: id.into(),
            object: default_object(),
            created: None,
            owned_by: owned_by.map(str::to_string),
        }
    }
}

fn default_object() -> String {
    DEFAULT_MODEL_OBJECT.to_string()
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|seconds| seconds.is_finite())
                .map(|seconds| seconds as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

/// The built-in catalog, already sorted by id.
pub fn fallback_catalog() -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = FALLBACK_MODEL_IDS
        .iter()
        .map(|id| ModelDescriptor::new(*id, Some(FALLBACK_MODEL_OWNER)))
        .collect();
    sort_models(&mut models);
    models
}

/// Order by `id`, byte-wise ascending.
pub fn sort_models(models: &mut [ModelDescriptor]) {
    models.sort_by(|a, b| a.id.cmp(&b.id));
}

/// Outcome of a listing: the models to show, plus why the fallback was used if it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelListing {
    pub models: Vec<ModelDescriptor>,
    pub error: Option<ClassifiedError>,
}

impl ModelListing {
    pub fn uses_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Accepted layouts of a models response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelsShape {
    /// `{ "data": [...] }`
    Standard,
    /// `[...]`
    BareArray,
    /// `{ "models": [...] }`
    Wrapped,
}

impl ModelsShape {
    /// Shapes in the order they are tried.
    pub const ACCEPTANCE_ORDER: [ModelsShape; 3] = [
        ModelsShape::Standard,
        ModelsShape::BareArray,
        ModelsShape::Wrapped,
    ];

    fn entries(self, payload: &Value) -> Option<&Vec<Value>> {
        match self {
            ModelsShape::Standard => payload.get("data")?.as_array(),
            ModelsShape::BareArray => payload.as_array(),
            ModelsShape::Wrapped => payload.get("models")?.as_array(),
        }
    }

    /// First shape in acceptance order that matches, with its entries.
    pub fn detect(payload: &Value) -> Option<(ModelsShape, &Vec<Value>)> {
        Self::ACCEPTANCE_ORDER
            .into_iter()
            .find_map(|shape| shape.entries(payload).map(|entries| (shape, entries)))
    }
}

/// Parse a models response body into a sorted list.
///
/// Entries that cannot be read (no string `id`) are skipped with a warning. The
/// body is rejected only when a non-empty list yields no usable entry.
pub fn parse_models(body: &str) -> Result<Vec<ModelDescriptor>, UpstreamError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| UpstreamError::invalid_json(&e, body))?;

    let (shape, entries) = ModelsShape::detect(&payload).ok_or_else(|| {
        UpstreamError::unexpected_format(format!(
            "Expected models array but got {}",
            describe_payload(&payload)
        ))
    })?;

    let mut models = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match ModelDescriptor::deserialize(entry) {
            Ok(model) => models.push(model),
            Err(e) => warn!("Skipping malformed model entry {index} in {shape:?} list: {e}"),
        }
    }

    if models.is_empty() && !entries.is_empty() {
        return Err(UpstreamError::unexpected_format(format!(
            "No usable model entries in {shape:?} list of {}",
            entries.len()
        )));
    }

    sort_models(&mut models);
    Ok(models)
}

fn describe_payload(payload: &Value) -> String {
    match payload {
        Value::Object(map) => format!(
            "object with keys: {}",
            map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
    }
}

/// Lists models from an upstream endpoint, degrading to a fixed catalog.
#[derive(Clone)]
pub struct ModelCatalogClient {
    upstream: UpstreamClient,
    fallback: Vec<ModelDescriptor>,
}

impl ModelCatalogClient {
    /// Catalog client using [`fallback_catalog`].
    pub fn new(upstream: UpstreamClient) -> Self {
        Self::with_fallback(upstream, fallback_catalog())
    }

    pub fn with_fallback(upstream: UpstreamClient, mut fallback: Vec<ModelDescriptor>) -> Self {
        sort_models(&mut fallback);
        Self { upstream, fallback }
    }

    /// List models. Always resolves; check [`ModelListing::error`] for degradation.
    pub async fn list_models(&self, credentials: &UpstreamCredentials) -> ModelListing {
        let Some(api_key) = credentials.api_key() else {
            return self.degraded(ClassifiedError::missing_credential());
        };

        match self.fetch(api_key, credentials.base_url()).await {
            Ok(models) => {
                info!("Fetched {} model(s)", models.len());
                ModelListing {
                    models,
                    error: None,
                }
            }
            Err(error) => {
                warn!("Model listing failed, using fallback catalog: {error}");
                self.degraded(classify(&error, Operation::ListModels))
            }
        }
    }

    fn degraded(&self, error: ClassifiedError) -> ModelListing {
        ModelListing {
            models: self.fallback.clone(),
            error: Some(error),
        }
    }

    async fn fetch(
        &self,
        api_key: &RedactedApiKey,
        base_url: &str,
    ) -> Result<Vec<ModelDescriptor>, UpstreamError> {
        let url = resolve(base_url, EndpointKind::Models);
        info!("Fetching models from: {url}");

        let response = self
            .upstream
            .request(Method::GET, url.as_str(), api_key, BrowserProfile::Listing)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        parse_models(&body)
    }
}
