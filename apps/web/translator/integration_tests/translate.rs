use crate::helpers::{TEST_API_KEY, spawn_without_ocr};

use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_translate(base_url: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base_url}/api/translate"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn given_missing_text_when_translating_then_missing_parameters() {
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_translate(
        &base_url,
        json!({"sourceLang": "English", "targetLang": "French", "apiKey": TEST_API_KEY}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required parameters"}));
}

#[tokio::test]
async fn given_missing_api_key_when_translating_then_api_key_required() {
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_translate(
        &base_url,
        json!({"text": "Hello", "sourceLang": "English", "targetLang": "French"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "API key is required"}));
}

/// **VALUE**: Verifies a translation end to end through the local service.
///
/// **WHY THIS MATTERS**: This is the main user flow; the UI reads `translatedText`.
///
/// **BUG THIS CATCHES**: Would catch a renamed response field or a dropped `model`.
#[tokio::test]
async fn given_working_upstream_when_translating_then_translated_text() {
    // GIVEN: Upstream that answers for the requested model
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "\nHola mundo\n"}}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let base_url = spawn_without_ocr().await;

    // WHEN: Translating
    let (status, body) = post_translate(
        &base_url,
        json!({
            "text": "Hello world",
            "sourceLang": "English",
            "targetLang": "Spanish",
            "apiKey": TEST_API_KEY,
            "baseURL": format!("{}/v1/", upstream.uri()),
            "model": "gpt-4o"
        }),
    )
    .await;

    // THEN: Trimmed translation
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"translatedText": "Hola mundo"}));
}

#[tokio::test]
async fn given_rate_limited_upstream_when_translating_then_500_with_classified_message() {
    let upstream = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(2)
        .mount(&upstream)
        .await;
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_translate(
        &base_url,
        json!({
            "text": "Hello",
            "sourceLang": "English",
            "targetLang": "German",
            "apiKey": TEST_API_KEY,
            "baseURL": upstream.uri()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Rate limit exceeded. Please try again later."})
    );
}

#[tokio::test]
async fn given_html_error_page_when_translating_then_message_has_no_markup() {
    let upstream = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(502).set_body_string(
            "<!DOCTYPE html><html><head><title>502</title></head><body>Bad gateway</body></html>",
        ))
        .mount(&upstream)
        .await;
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_translate(
        &base_url,
        json!({
            "text": "Hello",
            "sourceLang": "English",
            "targetLang": "German",
            "apiKey": TEST_API_KEY,
            "baseURL": upstream.uri()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().expect("error message");
    assert!(!message.contains('<'), "HTML leaked: {message}");
    assert!(message.chars().count() <= 200);
}
