use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum OcrError {
    #[error("Invalid Image Error: {message} {location}")]
    InvalidImage {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Language Error: {message} {location}")]
    InvalidLanguage {
        message: String,
        location: ErrorLocation,
    },

    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Engine Error: {message} {location}")]
    Engine {
        message: String,
        location: ErrorLocation,
    },
}

impl OcrError {
    #[track_caller]
    pub fn invalid_image(message: impl Into<String>) -> Self {
        OcrError::InvalidImage {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_language(message: impl Into<String>) -> Self {
        OcrError::InvalidLanguage {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn engine(message: impl Into<String>) -> Self {
        OcrError::Engine {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether the caller sent something unusable, as opposed to the engine failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OcrError::InvalidImage { .. } | OcrError::InvalidLanguage { .. }
        )
    }

    /// Message suitable for a response body (no location, no source chain).
    pub fn user_message(&self) -> String {
        match self {
            OcrError::InvalidImage { message, .. }
            | OcrError::InvalidLanguage { message, .. }
            | OcrError::Spawn { message, .. }
            | OcrError::Engine { message, .. } => message.clone(),
        }
    }
}
