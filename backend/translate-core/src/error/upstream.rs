//! Raw failures from talking to an upstream endpoint.
//!
//! These are the classifier's input. They keep the HTTP status as a number and
//! the transport category as flags so classification never has to parse
//! strings back apart.

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Longest body excerpt kept on a JSON parse failure.
const JSON_EXCERPT_CHARS: usize = 200;

#[derive(Debug, ThisError)]
pub enum UpstreamError {
    #[error("HTTP Error: {status_code} - {body} {location}")]
    Http {
        status_code: HttpStatusCode,
        body: String,
        location: ErrorLocation,
    },

    #[error("Network Error: {message} {location}")]
    Network {
        message: String,
        is_connect: bool,
        is_timeout: bool,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        excerpt: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unexpected Format Error: {message} {location}")]
    UnexpectedFormat {
        message: String,
        location: ErrorLocation,
    },
}

impl UpstreamError {
    /// Create from reqwest error with proper categorization.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        // Check for specific error types BEFORE converting to string
        let is_timeout = error.is_timeout();
        let is_connect = error.is_connect();

        if is_timeout || is_connect {
            return UpstreamError::Network {
                message: error.to_string(),
                is_connect,
                is_timeout,
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if let Some(status) = error.status() {
            return UpstreamError::Http {
                status_code: HttpStatusCode(status.as_u16()),
                body: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        UpstreamError::Network {
            message: error.to_string(),
            is_connect: false,
            is_timeout: false,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from a non-success HTTP response with its full body.
    #[track_caller]
    pub fn from_http_response(status_code: u16, body: impl Into<String>) -> Self {
        UpstreamError::Http {
            status_code: HttpStatusCode(status_code),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from a body that failed to parse as JSON.
    #[track_caller]
    pub fn invalid_json(error: &serde_json::Error, body: &str) -> Self {
        UpstreamError::Json {
            message: error.to_string(),
            excerpt: body.chars().take(JSON_EXCERPT_CHARS).collect(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unexpected_format(message: impl Into<String>) -> Self {
        UpstreamError::UnexpectedFormat {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Get HTTP status code if applicable.
    pub fn status_code(&self) -> Option<HttpStatusCode> {
        match self {
            UpstreamError::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// The failure as a single line of text, without location.
    ///
    /// HTTP failures keep the `HTTP <status>: <body>` shape so the classifier
    /// can strip the prefix before showing anything to a user.
    pub fn raw_message(&self) -> String {
        match self {
            UpstreamError::Http {
                status_code, body, ..
            } => format!("HTTP {status_code}: {body}"),
            UpstreamError::Network { message, .. } => message.clone(),
            UpstreamError::Json { excerpt, .. } => {
                format!("Invalid JSON response: {excerpt}...")
            }
            UpstreamError::UrlParse { message, .. } => message.clone(),
            UpstreamError::UnexpectedFormat { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        UpstreamError::from_reqwest(&error)
    }
}

impl From<url::ParseError> for UpstreamError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        UpstreamError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
