use crate::config::AppConfig;
use crate::error::TranslatorError;

use translate_core::models::ModelCatalogClient;
use translate_core::ocr::{OcrEngine, TesseractCli};
use translate_core::translation::Translator;
use translate_core::upstream::UpstreamClient;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::info;

/// Shared, read-only handles used by every request.
///
/// Holds no per-request or per-user data: credentials arrive with each call.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ModelCatalogClient,
    pub translator: Translator,
    /// `None` when OCR is disabled.
    pub ocr: Option<Arc<dyn OcrEngine>>,
    pub ocr_language: String,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(
        upstream: UpstreamClient,
        ocr: Option<Arc<dyn OcrEngine>>,
        ocr_language: impl Into<String>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            catalog: ModelCatalogClient::new(upstream.clone()),
            translator: Translator::new(upstream),
            ocr,
            ocr_language: ocr_language.into(),
            max_image_bytes,
        }
    }

    /// Build state from a validated config.
    pub fn from_config(config: &AppConfig) -> Result<Self, TranslatorError> {
        let upstream =
            UpstreamClient::new(config.upstream_options()).map_err(|e| TranslatorError::Core {
                message: format!("Failed to build upstream client: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let ocr: Option<Arc<dyn OcrEngine>> = if config.ocr.enabled {
            info!("OCR enabled using {}", config.ocr.tesseract_binary);
            Some(Arc::new(TesseractCli::new(&config.ocr.tesseract_binary)))
        } else {
            info!("OCR disabled");
            None
        };

        Ok(Self::new(
            upstream,
            ocr,
            config.ocr.default_language.clone(),
            config.ocr.max_image_bytes,
        ))
    }
}
