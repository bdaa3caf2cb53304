use crate::helpers::{
    DEFAULT_IMAGE_LIMIT, FailingOcr, StubOcr, spawn_service, spawn_without_ocr, upstream,
};

use translator::state::AppState;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

// "hello" in base64
const HELLO_BASE64: &str = "aGVsbG8=";

async fn post_ocr(base_url: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base_url}/api/ocr"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn given_ocr_disabled_when_recognizing_then_service_unavailable() {
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_ocr(&base_url, json!({"imageData": HELLO_BASE64})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

/// **VALUE**: Verifies the image reaches the engine decoded, with the default language.
///
/// **WHY THIS MATTERS**: Browsers hand over `data:` URLs from canvas/file readers;
/// the engine must receive raw image bytes.
///
/// **BUG THIS CATCHES**: Would catch the data URL prefix being fed to the base64
/// decoder or the default language not being applied.
#[tokio::test]
async fn given_data_url_when_recognizing_then_engine_gets_bytes_and_default_language() {
    // GIVEN: A stub engine
    let engine = StubOcr::new("Hello world", 93);
    let state = AppState::new(upstream(), Some(engine.clone()), "eng", DEFAULT_IMAGE_LIMIT);
    let base_url = spawn_service(state).await;

    // WHEN: Posting a data URL without a language
    let (status, body) = post_ocr(
        &base_url,
        json!({"imageData": format!("data:image/png;base64,{HELLO_BASE64}")}),
    )
    .await;

    // THEN: Recognition returned, engine saw the decoded bytes
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "Hello world", "confidence": 93}));
    assert_eq!(engine.calls(), vec![(b"hello".to_vec(), String::from("eng"))]);
}

#[tokio::test]
async fn given_explicit_language_when_recognizing_then_forwarded() {
    let engine = StubOcr::new("你好", 80);
    let state = AppState::new(upstream(), Some(engine.clone()), "eng", DEFAULT_IMAGE_LIMIT);
    let base_url = spawn_service(state).await;

    let (status, _) = post_ocr(
        &base_url,
        json!({"imageData": HELLO_BASE64, "language": "chi_sim+eng"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.calls()[0].1, "chi_sim+eng");
}

#[tokio::test]
async fn given_invalid_base64_when_recognizing_then_bad_request_without_engine_call() {
    let engine = StubOcr::new("unused", 0);
    let state = AppState::new(upstream(), Some(engine.clone()), "eng", DEFAULT_IMAGE_LIMIT);
    let base_url = spawn_service(state).await;

    let (status, body) = post_ocr(&base_url, json!({"imageData": "not base64!!"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn given_missing_image_when_recognizing_then_bad_request() {
    let engine = StubOcr::new("unused", 0);
    let state = AppState::new(upstream(), Some(engine), "eng", DEFAULT_IMAGE_LIMIT);
    let base_url = spawn_service(state).await;

    let (status, body) = post_ocr(&base_url, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Image data is required"}));
}

#[tokio::test]
async fn given_image_over_limit_when_recognizing_then_payload_too_large() {
    let engine = StubOcr::new("unused", 0);
    let state = AppState::new(upstream(), Some(engine.clone()), "eng", 4);
    let base_url = spawn_service(state).await;

    let (status, _) = post_ocr(&base_url, json!({"imageData": HELLO_BASE64})).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn given_engine_failure_when_recognizing_then_server_error_with_message() {
    let state = AppState::new(upstream(), Some(Arc::new(FailingOcr)), "eng", DEFAULT_IMAGE_LIMIT);
    let base_url = spawn_service(state).await;

    let (status, body) = post_ocr(&base_url, json!({"imageData": HELLO_BASE64})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "OCR processing failed (exit status: 1)"})
    );
}
