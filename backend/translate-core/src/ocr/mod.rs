//! OCR adapter boundary.
//!
//! The recognition engine is a black box: image bytes plus a language hint in,
//! recognized text plus a 0-100 confidence out.

pub mod tesseract;

pub use tesseract::TesseractCli;

use crate::error::OcrError;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::BoxFuture;
use serde::Serialize;

pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

const DATA_URL_PREFIX: &str = "data:";
const DATA_URL_SEPARATOR: char = ',';

/// Text recognized in an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recognition {
    pub text: String,
    /// Rounded mean confidence, 0-100.
    pub confidence: u8,
}

/// A text-recognition engine.
pub trait OcrEngine: Send + Sync {
    fn recognize<'a>(
        &'a self,
        image: &'a [u8],
        language: &'a str,
    ) -> BoxFuture<'a, Result<Recognition, OcrError>>;
}

/// Decode the `imageData` field: raw base64 or a `data:<mime>;base64,` URL.
pub fn decode_image_data(raw: &str) -> Result<Vec<u8>, OcrError> {
    let trimmed = raw.trim();

    let encoded = if trimmed.starts_with(DATA_URL_PREFIX) {
        trimmed
            .split_once(DATA_URL_SEPARATOR)
            .map(|(_, data)| data)
            .ok_or_else(|| OcrError::invalid_image("Data URL has no payload"))?
    } else {
        trimmed
    };

    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(OcrError::invalid_image("Image data is required"));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| OcrError::invalid_image(format!("Image data is not valid base64: {e}")))
}

/// Check a tesseract-style language string such as `eng` or `chi_sim+eng`.
pub fn validate_language(language: &str) -> Result<(), OcrError> {
    let valid = !language.is_empty()
        && !language.starts_with('+')
        && !language.ends_with('+')
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+'));

    if valid {
        Ok(())
    } else {
        Err(OcrError::invalid_language(format!(
            "Unsupported OCR language: {language}"
        )))
    }
}
