use crate::helpers::{TEST_API_KEY, spawn_without_ocr};

use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn post_models(base_url: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base_url}/api/models"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn given_blank_api_key_when_listing_then_bad_request() {
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_models(&base_url, json!({"apiKey": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "API key is required"}));
}

/// **VALUE**: Verifies the full path from the UI's request to the upstream listing.
///
/// **WHY THIS MATTERS**: `baseURL` (capitalised as the UI sends it) must reach the
/// resolver, and the key must arrive upstream as a bearer token.
///
/// **BUG THIS CATCHES**: Would catch a serde rename mismatch that silently sends
/// requests to the default OpenAI endpoint.
#[tokio::test]
async fn given_upstream_models_when_listing_then_sorted_without_error() {
    // GIVEN: Upstream with two models
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer sk-test-key-12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "gpt-4o-mini", "object": "model", "owned_by": "system"},
                {"id": "gpt-4.1", "object": "model", "created": 1744316542}
            ]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let base_url = spawn_without_ocr().await;

    // WHEN: Listing through the service
    let (status, body) = post_models(
        &base_url,
        json!({"apiKey": TEST_API_KEY, "baseURL": format!("{}/v1", upstream.uri())}),
    )
    .await;

    // THEN: Sorted models, no fallback
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usesFallback"], json!(false));
    assert!(body.get("error").is_none());
    assert_eq!(body["models"][0]["id"], "gpt-4.1");
    assert_eq!(body["models"][0]["created"], 1744316542);
    assert_eq!(body["models"][1]["id"], "gpt-4o-mini");
    assert_eq!(body["models"][1]["owned_by"], "system");
}

#[tokio::test]
async fn given_upstream_rejects_key_when_listing_then_fallback_with_error_note() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&upstream)
        .await;
    let base_url = spawn_without_ocr().await;

    let (status, body) = post_models(
        &base_url,
        json!({"apiKey": TEST_API_KEY, "baseURL": upstream.uri()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usesFallback"], json!(true));
    assert_eq!(body["error"], "Invalid API key. Please check your API key.");
    let ids: Vec<&str> = body["models"]
        .as_array()
        .expect("models array")
        .iter()
        .filter_map(|model| model["id"].as_str())
        .collect();
    assert_eq!(ids, ["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview", "gpt-4o"]);
    assert_eq!(body["models"][0]["owned_by"], "openai");
}
