use crate::helpers::{BEARER, CHAT_PATH, completion_body, credentials, upstream};

use translate_core::classifier::ErrorKind;
use translate_core::translation::{TranslationRequest, Translator};
use translate_core::upstream::UpstreamCredentials;

use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(text: &str) -> TranslationRequest {
    TranslationRequest {
        text: text.to_string(),
        source_lang: String::from("English"),
        target_lang: String::from("French"),
        model: None,
    }
}

/// **VALUE**: Verifies input validation happens before any network call.
///
/// **WHY THIS MATTERS**: An empty textarea must not cost the user an API call.
///
/// **BUG THIS CATCHES**: Would catch validation moving after the primary call.
#[tokio::test]
async fn given_empty_text_when_translating_then_invalid_input_without_request() {
    // GIVEN: A server that must not be called
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    // WHEN: Translating empty text
    let result = translator.translate(&request(""), &credentials(&server)).await;

    // THEN: InvalidInput
    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn given_blank_language_when_translating_then_invalid_input() {
    let translator = Translator::new(upstream(true));
    let mut blank_target = request("Hello");
    blank_target.target_lang = String::from("  ");

    let result = translator
        .translate(&blank_target, &UpstreamCredentials::new("sk-x", None))
        .await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn given_missing_api_key_when_translating_then_missing_credential() {
    let translator = Translator::new(upstream(true));

    let result = translator
        .translate(&request("Hello"), &UpstreamCredentials::new("", None))
        .await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::MissingCredential));
}

/// **VALUE**: Verifies the payload sent upstream and that a primary success ends the call.
///
/// **WHY THIS MATTERS**: Temperature, token limit, and default model are part of the
/// contract with upstream; the fallback must not fire after a success.
///
/// **BUG THIS CATCHES**: Would catch a changed default model or a second request.
#[tokio::test]
async fn given_primary_success_when_translating_then_single_request_with_expected_payload() {
    // GIVEN: Upstream that answers once
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", BEARER))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "temperature": 0.3,
            "max_tokens": 2000,
            "messages": [{"role": "user"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Bonjour le monde")))
        .expect(1)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    // WHEN: Translating
    let result = translator
        .translate(&request("Hello world"), &credentials(&server))
        .await;

    // THEN: Translated text from the first call
    assert_eq!(result.expect("translation").translated_text, "Bonjour le monde");
}

/// **VALUE**: Verifies the fallback path rescues a failed primary call.
///
/// **WHY THIS MATTERS**: Some proxies reject the first request shape but accept the raw one.
/// The user should get a translation, trimmed of the padding models like to add.
///
/// **BUG THIS CATCHES**: Would catch the fallback never running, running twice, or the
/// content not being trimmed.
#[tokio::test]
async fn given_primary_failure_when_translating_then_fallback_result_is_trimmed() {
    // GIVEN: First request fails, second succeeds
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("sdk path exploded"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "  Bonjour  "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    // WHEN: Translating
    let result = translator
        .translate(&request("Hello"), &credentials(&server))
        .await;

    // THEN: Fallback content, trimmed
    assert_eq!(result.expect("translation").translated_text, "Bonjour");
}

#[tokio::test]
async fn given_browser_headers_when_translating_then_each_path_uses_its_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("sec-fetch-site", "cross-site"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("sec-fetch-site", "same-site"))
        .and(header("origin", "https://chat.openai.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hallo")))
        .expect(1)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    let mut german = request("Hello");
    german.target_lang = String::from("German");
    let result = translator.translate(&german, &credentials(&server)).await;

    assert_eq!(result.expect("translation").translated_text, "Hallo");
}

/// **VALUE**: Verifies that when both paths fail the classified error of the last is surfaced.
///
/// **WHY THIS MATTERS**: A wrong key must say "invalid API key", not a generic failure.
///
/// **BUG THIS CATCHES**: Would catch a third attempt or a swallowed error.
#[tokio::test]
async fn given_both_paths_unauthorized_when_translating_then_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"Incorrect API key"}}"#))
        .expect(2)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    let result = translator
        .translate(&request("Hello"), &credentials(&server))
        .await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn given_unknown_model_when_translating_then_model_unavailable_names_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_partial_json(json!({"model": "gpt-9"})))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"error":{"message":"The model `gpt-9` does not exist","code":"model_not_found"}}"#,
        ))
        .expect(2)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(false));
    let mut with_model = request("Hello");
    with_model.model = Some(String::from("gpt-9"));

    let error = translator
        .translate(&with_model, &credentials(&server))
        .await
        .expect_err("model missing");

    assert_eq!(error.kind, ErrorKind::ModelUnavailable);
    assert!(error.message.contains("gpt-9"));
}

#[tokio::test]
async fn given_empty_completion_when_translating_then_empty_result_without_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
        .expect(1)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    let result = translator
        .translate(&request("Hello"), &credentials(&server))
        .await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::EmptyResult));
}

#[tokio::test]
async fn given_html_from_both_paths_when_translating_then_bad_response_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>portal</body></html>"))
        .expect(2)
        .mount(&server)
        .await;
    let translator = Translator::new(upstream(true));

    let result = translator
        .translate(&request("Hello"), &credentials(&server))
        .await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::BadResponseFormat));
}

#[tokio::test]
async fn given_refused_connection_when_translating_then_unreachable() {
    let translator = Translator::new(upstream(true));
    let credentials = UpstreamCredentials::new("sk-x", Some("http://127.0.0.1:1/v1"));

    let result = translator.translate(&request("Hello"), &credentials).await;

    assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::Unreachable));
}
