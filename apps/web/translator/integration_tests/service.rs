use crate::helpers::spawn_without_ocr;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn given_running_service_when_checking_health_then_ok() {
    let base_url = spawn_without_ocr().await;

    let response = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "OK");
}

/// **VALUE**: Verifies the API routes only accept POST.
///
/// **WHY THIS MATTERS**: Credentials travel in the body; a GET form would put them
/// in URLs and access logs.
///
/// **BUG THIS CATCHES**: Would catch a route registered with `any()` or `get()`.
#[tokio::test]
async fn given_get_request_when_calling_api_routes_then_method_not_allowed() {
    // GIVEN: A running service
    let base_url = spawn_without_ocr().await;

    for route in ["/api/models", "/api/translate", "/api/ocr"] {
        // WHEN: GETting the route
        let response = reqwest::get(format!("{base_url}{route}"))
            .await
            .expect("request");

        // THEN: 405
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{route} should reject GET"
        );
    }
}

#[tokio::test]
async fn given_malformed_json_when_posting_then_bad_request_with_error_body() {
    let base_url = spawn_without_ocr().await;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/api/translate"))
        .header("content-type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json body");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn given_cross_origin_request_when_posting_then_cors_headers_present() {
    let base_url = spawn_without_ocr().await;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/api/models"))
        .header("origin", "http://localhost:5173")
        .body("{}")
        .send()
        .await
        .expect("request");

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}
