//! Upstream adaptation layer for an OpenAI-compatible translation service.
//!
//! Callers hand in credentials per call; nothing here caches or persists them.
//! Every fallible operation ends in a [`classifier::ClassifiedError`] before it
//! leaves the crate.

pub mod classifier;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod ocr;
pub mod translation;
pub mod upstream;

#[cfg(test)]
mod tests;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const MODELS_PATH: &str = "/models";
pub const VERSIONED_MODELS_PATH: &str = const_format::concatcp!("/v1", MODELS_PATH);
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
