//! Translation through an OpenAI-compatible chat completion endpoint.
//!
//! Two call paths, tried strictly in order:
//!
//! 1. a typed client call (validated base URL, typed request/response bodies)
//! 2. a raw HTTP POST of the same payload, read as text and probed as JSON
//!
//! The second path runs at most once and only after the first has failed.
//! This is a transport fallback, not a retry policy.

use crate::classifier::{ClassifiedError, Operation, classify};
use crate::endpoint::{EndpointKind, resolve};
use crate::error::UpstreamError;
use crate::upstream::{BrowserProfile, UpstreamClient, UpstreamCredentials, read_success_body};

use common::RedactedApiKey;

use std::future::Future;

use log::{debug, info, warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 2000;

const USER_ROLE: &str = "user";
const CONTENT_POINTER: &str = "/choices/0/message/content";

/// What to translate, and with which model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    fn single_user_message(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: USER_ROLE,
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Instruction prompt followed by the input text, verbatim.
pub fn build_prompt(source_lang: &str, target_lang: &str, text: &str) -> String {
    format!(
        "Please translate the following text from {source_lang} to {target_lang}. Only return the translated text without any additional explanation or formatting:\n\n{text}"
    )
}

/// Run `primary`; if it fails, hand its error to `fallback` and run that once.
pub async fn with_fallback<T, E, P, F, Fut>(primary: P, fallback: F) -> Result<T, E>
where
    P: Future<Output = Result<T, E>>,
    F: FnOnce(E) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match primary.await {
        Ok(value) => Ok(value),
        Err(error) => fallback(error).await,
    }
}

/// Trim the completion content into a result, rejecting empty output.
pub fn extract_translation(content: Option<String>) -> Result<TranslationResult, ClassifiedError> {
    let translated_text = content
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(ClassifiedError::empty_result)?;

    Ok(TranslationResult {
        translated_text: translated_text.to_string(),
    })
}

#[derive(Clone)]
pub struct Translator {
    upstream: UpstreamClient,
}

impl Translator {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Translate `request.text`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`](crate::classifier::ErrorKind::InvalidInput)
    ///   when text or either language is blank
    /// - [`ErrorKind::MissingCredential`](crate::classifier::ErrorKind::MissingCredential)
    ///   when no API key was supplied
    /// - the classified failure of the fallback path when both paths fail
    /// - [`ErrorKind::EmptyResult`](crate::classifier::ErrorKind::EmptyResult)
    ///   when the completion has no content
    pub async fn translate(
        &self,
        request: &TranslationRequest,
        credentials: &UpstreamCredentials,
    ) -> Result<TranslationResult, ClassifiedError> {
        if request.text.trim().is_empty()
            || request.source_lang.trim().is_empty()
            || request.target_lang.trim().is_empty()
        {
            return Err(ClassifiedError::invalid_input());
        }

        let api_key = credentials
            .api_key()
            .ok_or_else(ClassifiedError::missing_credential)?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(self.upstream.options().default_model.as_str());

        let prompt = build_prompt(
            request.source_lang.trim(),
            request.target_lang.trim(),
            &request.text,
        );
        let payload = ChatCompletionRequest::single_user_message(model, &prompt);
        let base_url = credentials.base_url();

        info!(
            "Translating {} chars from {} to {} with model {model}",
            request.text.chars().count(),
            request.source_lang,
            request.target_lang
        );

        let content = with_fallback(
            self.typed_completion(&payload, api_key, base_url),
            |primary_error| {
                warn!("Primary completion path failed, trying direct request: {primary_error}");
                self.direct_completion(&payload, api_key, base_url)
            },
        )
        .await
        .map_err(|error| {
            let classified = classify(&error, Operation::Translate { model });
            warn!("Translation failed ({:?}): {error}", classified.kind);
            classified
        })?;

        extract_translation(content)
    }

    async fn typed_completion(
        &self,
        payload: &ChatCompletionRequest<'_>,
        api_key: &RedactedApiKey,
        base_url: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let url = Url::parse(&resolve(base_url, EndpointKind::Chat))?;
        debug!("Typed completion request to {url}");

        let response = self
            .upstream
            .request(Method::POST, url, api_key, BrowserProfile::Sdk)
            .json(payload)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| UpstreamError::invalid_json(&e, &body))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }

    async fn direct_completion(
        &self,
        payload: &ChatCompletionRequest<'_>,
        api_key: &RedactedApiKey,
        base_url: &str,
    ) -> Result<Option<String>, UpstreamError> {
        let url = resolve(base_url, EndpointKind::Chat);
        debug!("Direct completion request to {url}");

        let body = serde_json::to_string(payload)
            .map_err(|e| UpstreamError::unexpected_format(format!("Unserializable payload: {e}")))?;

        let response = self
            .upstream
            .request(Method::POST, url.as_str(), api_key, BrowserProfile::Direct)
            .body(body)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let completion: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::invalid_json(&e, &body))?;

        Ok(completion
            .pointer(CONTENT_POINTER)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}
