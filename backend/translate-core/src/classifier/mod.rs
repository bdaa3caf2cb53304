//! Maps raw upstream failures onto a closed set of user-facing errors.
//!
//! Pure functions only. Both the model catalog and the translation client run
//! their failures through [`classify`]; the catalog keeps the result as a note
//! next to its fallback list, the translator hands it back to its caller.

use crate::error::UpstreamError;

use common::HttpStatusCode;

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error as ThisError;

/// Upper bound on any message derived from upstream text.
pub const MAX_MESSAGE_CHARS: usize = 200;

const ELLIPSIS: &str = "...";
const HTML_DOCUMENT_PATTERN: &str = r"(?is)<!DOCTYPE html>.*?</html>|<html[\s>].*?</html>";
const UNTERMINATED_HTML_PATTERN: &str = r"(?is)(?:<!DOCTYPE html|<html[\s>]).*$";
const HTTP_PREFIX_PATTERN: &str = r"^\s*HTTP \d{3}:\s*";
const MARKUP_PATTERN: &str = r"</?[A-Za-z!][^>]*>?";

const MISSING_CREDENTIAL_MESSAGE: &str = "API key is required";
const INVALID_INPUT_MESSAGE: &str = "Missing required parameters";
const UNAUTHORIZED_MESSAGE: &str = "Invalid API key. Please check your API key.";
const BLOCKED_MESSAGE: &str = "API endpoint blocked by security service. Please check your Base URL or try using the official OpenAI endpoint.";
const FORBIDDEN_MESSAGE: &str =
    "Access denied. Please check your API key and endpoint configuration.";
const MODELS_NOT_FOUND_MESSAGE: &str =
    "Models endpoint not found. This API may not support model listing.";
const CHAT_NOT_FOUND_MESSAGE: &str =
    "API endpoint not found. Please check your Base URL configuration.";
const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
const UNREACHABLE_MESSAGE: &str = "Cannot connect to API endpoint. Please check your Base URL.";
const BAD_FORMAT_MESSAGE: &str =
    "Invalid response format. The endpoint may not be compatible with OpenAI API format.";
const UNEXPECTED_FORMAT_MESSAGE: &str =
    "Unexpected response format. Expected a list of models.";
const EMPTY_RESULT_MESSAGE: &str = "Failed to get translation";
const NETWORK_MESSAGE: &str =
    "Network error. Please check your internet connection and API endpoint.";
const MODELS_GENERIC_MESSAGE: &str = "Failed to fetch models";
const TRANSLATE_GENERIC_MESSAGE: &str = "Translation failed";

static HTML_REGEX: OnceLock<Regex> = OnceLock::new();
static UNTERMINATED_HTML_REGEX: OnceLock<Regex> = OnceLock::new();
static HTTP_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();

fn html_regex() -> &'static Regex {
    HTML_REGEX.get_or_init(|| Regex::new(HTML_DOCUMENT_PATTERN).expect("valid regex pattern"))
}

fn unterminated_html_regex() -> &'static Regex {
    UNTERMINATED_HTML_REGEX
        .get_or_init(|| Regex::new(UNTERMINATED_HTML_PATTERN).expect("valid regex pattern"))
}

fn markup_regex() -> &'static Regex {
    MARKUP_REGEX.get_or_init(|| Regex::new(MARKUP_PATTERN).expect("valid regex pattern"))
}

fn http_prefix_regex() -> &'static Regex {
    HTTP_PREFIX_REGEX.get_or_init(|| Regex::new(HTTP_PREFIX_PATTERN).expect("valid regex pattern"))
}

/// Closed taxonomy of failures a caller can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingCredential,
    InvalidInput,
    Unauthorized,
    Forbidden,
    EndpointBlocked,
    EndpointNotFound,
    RateLimited,
    Unreachable,
    ModelUnavailable,
    BadResponseFormat,
    UnexpectedFormat,
    EmptyResult,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    /// Status the local HTTP surface answers with for this kind.
    ///
    /// Only problems with the caller's own request are 4xx; anything that went
    /// wrong upstream is reported as a 500.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::MissingCredential | ErrorKind::InvalidInput => 400,
            _ => 500,
        }
    }
}

/// A `{kind, message}` pair safe to show to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ThisError)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential() -> Self {
        Self::new(ErrorKind::MissingCredential, MISSING_CREDENTIAL_MESSAGE)
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput, INVALID_INPUT_MESSAGE)
    }

    pub fn empty_result() -> Self {
        Self::new(ErrorKind::EmptyResult, EMPTY_RESULT_MESSAGE)
    }
}

/// The operation that failed. Picks the wording for endpoint and generic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    ListModels,
    Translate { model: &'a str },
}

impl Operation<'_> {
    fn not_found_message(&self) -> &'static str {
        match self {
            Operation::ListModels => MODELS_NOT_FOUND_MESSAGE,
            Operation::Translate { .. } => CHAT_NOT_FOUND_MESSAGE,
        }
    }

    fn generic_message(&self) -> &'static str {
        match self {
            Operation::ListModels => MODELS_GENERIC_MESSAGE,
            Operation::Translate { .. } => TRANSLATE_GENERIC_MESSAGE,
        }
    }
}

/// Classify a raw upstream failure. First matching rule wins.
pub fn classify(error: &UpstreamError, operation: Operation<'_>) -> ClassifiedError {
    if let UpstreamError::Http {
        status_code, body, ..
    } = error
    {
        if let Some(classified) = classify_status(*status_code, body, operation) {
            return classified;
        }
    }

    match error {
        UpstreamError::Network {
            is_connect: true, ..
        }
        | UpstreamError::UrlParse { .. } => {
            ClassifiedError::new(ErrorKind::Unreachable, UNREACHABLE_MESSAGE)
        }
        UpstreamError::Json { .. } => {
            ClassifiedError::new(ErrorKind::BadResponseFormat, BAD_FORMAT_MESSAGE)
        }
        UpstreamError::UnexpectedFormat { .. } => {
            ClassifiedError::new(ErrorKind::UnexpectedFormat, UNEXPECTED_FORMAT_MESSAGE)
        }
        UpstreamError::Network { .. } => {
            ClassifiedError::new(ErrorKind::NetworkError, NETWORK_MESSAGE)
        }
        UpstreamError::Http { .. } => {
            let message = sanitize_message(&error.raw_message())
                .unwrap_or_else(|| operation.generic_message().to_string());
            ClassifiedError::new(ErrorKind::Unknown, message)
        }
    }
}

fn classify_status(
    status_code: HttpStatusCode,
    body: &str,
    operation: Operation<'_>,
) -> Option<ClassifiedError> {
    let body_lower = body.to_lowercase();

    let classified = match status_code {
        HttpStatusCode::UNAUTHORIZED => {
            ClassifiedError::new(ErrorKind::Unauthorized, UNAUTHORIZED_MESSAGE)
        }
        HttpStatusCode::FORBIDDEN
            if body_lower.contains("cloudflare") || body_lower.contains("blocked") =>
        {
            ClassifiedError::new(ErrorKind::EndpointBlocked, BLOCKED_MESSAGE)
        }
        HttpStatusCode::FORBIDDEN => ClassifiedError::new(ErrorKind::Forbidden, FORBIDDEN_MESSAGE),
        HttpStatusCode::BAD_REQUEST | HttpStatusCode::NOT_FOUND if body_lower.contains("model") => {
            match operation {
                Operation::Translate { model } => ClassifiedError::new(
                    ErrorKind::ModelUnavailable,
                    format!(
                        "Model \"{model}\" not available. Please check your model selection or try a different model."
                    ),
                ),
                Operation::ListModels if status_code == HttpStatusCode::NOT_FOUND => {
                    ClassifiedError::new(ErrorKind::EndpointNotFound, operation.not_found_message())
                }
                Operation::ListModels => return None,
            }
        }
        HttpStatusCode::NOT_FOUND => {
            ClassifiedError::new(ErrorKind::EndpointNotFound, operation.not_found_message())
        }
        HttpStatusCode::TOO_MANY_REQUESTS => {
            ClassifiedError::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE)
        }
        _ => return None,
    };

    Some(classified)
}

/// Strip embedded HTML documents and a leading `HTTP ddd:` prefix, then bound the length.
///
/// A document with no closing `</html>` is cut to the end of the text. Returns
/// `None` when nothing readable is left or markup remains.
pub fn sanitize_message(raw: &str) -> Option<String> {
    let without_html = html_regex().replace_all(raw, "");
    let without_open_html = unterminated_html_regex().replace(&without_html, "");
    let without_prefix = http_prefix_regex().replace(&without_open_html, "");
    let cleaned = without_prefix.trim();

    if cleaned.is_empty() || markup_regex().is_match(cleaned) {
        return None;
    }

    Some(truncate_chars(cleaned, MAX_MESSAGE_CHARS))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
