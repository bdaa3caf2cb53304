use crate::helpers::{BEARER, MODELS_PATH, TEST_API_KEY, credentials, upstream};

use translate_core::classifier::ErrorKind;
use translate_core::models::{ModelCatalogClient, fallback_catalog};
use translate_core::upstream::UpstreamCredentials;

use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// **VALUE**: Verifies that a missing API key never reaches the network.
///
/// **WHY THIS MATTERS**: The settings dialog refreshes models as soon as it opens, often
/// before a key is entered. Those calls must be free and must still fill the dropdown.
///
/// **BUG THIS CATCHES**: Would catch the key check moving after the request.
#[tokio::test]
async fn given_empty_api_key_when_listing_then_returns_fallback_without_request() {
    // GIVEN: A server that must not be called
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(true));
    let credentials = UpstreamCredentials::new("  ", Some(&server.uri()));

    // WHEN: Listing models
    let listing = catalog.list_models(&credentials).await;

    // THEN: Fallback catalog with MissingCredential
    assert_eq!(listing.models, fallback_catalog());
    assert_eq!(listing.models.len(), 4);
    assert_eq!(
        listing.error.map(|e| e.kind),
        Some(ErrorKind::MissingCredential)
    );
}

/// **VALUE**: Verifies the happy path: bearer auth, resolved path, sorted result.
///
/// **WHY THIS MATTERS**: This is the call every user makes when opening settings.
///
/// **BUG THIS CATCHES**: Would catch a missing Authorization header or a doubled `/v1`.
#[tokio::test]
async fn given_standard_response_when_listing_then_returns_sorted_models() {
    // GIVEN: Upstream returning two models out of order
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODELS_PATH))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"object":"list","data":[{"id":"b","object":"model"},{"id":"a","object":"model"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(true));

    // WHEN: Listing models
    let listing = catalog.list_models(&credentials(&server)).await;

    // THEN: Sorted, no degradation
    let ids: Vec<&str> = listing.models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(!listing.uses_fallback());
}

#[tokio::test]
async fn given_unversioned_base_and_bare_array_when_listing_then_appends_v1_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODELS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"llama3"},{"id":"qwen2"}]"#))
        .expect(1)
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(false));
    let credentials = UpstreamCredentials::new(TEST_API_KEY, Some(&server.uri()));

    let listing = catalog.list_models(&credentials).await;

    assert_eq!(listing.models.len(), 2);
    assert!(listing.error.is_none());
}

/// **VALUE**: Verifies that a non-JSON body degrades to the fallback instead of failing.
///
/// **WHY THIS MATTERS**: Misconfigured base URLs often point at a web page that answers 200
/// with HTML. The user should still get usable models plus an explanation.
///
/// **BUG THIS CATCHES**: Would catch the parse error escaping as a hard failure.
#[tokio::test]
async fn given_html_body_when_listing_then_fallback_with_bad_response_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODELS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<!DOCTYPE html><html><body>Welcome</body></html>"),
        )
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(true));

    let listing = catalog.list_models(&credentials(&server)).await;

    assert_eq!(listing.models, fallback_catalog());
    assert_eq!(
        listing.error.map(|e| e.kind),
        Some(ErrorKind::BadResponseFormat)
    );
}

#[tokio::test]
async fn given_unauthorized_when_listing_then_fallback_with_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODELS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid key"}"#))
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(true));

    let listing = catalog.list_models(&credentials(&server)).await;

    assert!(listing.uses_fallback());
    assert_eq!(listing.error.map(|e| e.kind), Some(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn given_unknown_shape_when_listing_then_fallback_with_unexpected_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MODELS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":"ok"}"#))
        .mount(&server)
        .await;
    let catalog = ModelCatalogClient::new(upstream(true));

    let listing = catalog.list_models(&credentials(&server)).await;

    assert_eq!(
        listing.error.map(|e| e.kind),
        Some(ErrorKind::UnexpectedFormat)
    );
}

#[tokio::test]
async fn given_refused_connection_when_listing_then_fallback_with_unreachable() {
    let catalog = ModelCatalogClient::new(upstream(true));
    let credentials = UpstreamCredentials::new(TEST_API_KEY, Some("http://127.0.0.1:1"));

    let listing = catalog.list_models(&credentials).await;

    assert_eq!(listing.models, fallback_catalog());
    assert_eq!(listing.error.map(|e| e.kind), Some(ErrorKind::Unreachable));
}

/// **VALUE**: Verifies that compatibility headers follow the `browser_headers` switch.
///
/// **WHY THIS MATTERS**: Some gateways reject spoofed browser headers just as others require
/// them. Operators must be able to turn them off without a rebuild.
///
/// **BUG THIS CATCHES**: Would catch headers being sent unconditionally.
#[tokio::test]
async fn given_browser_headers_toggle_when_listing_then_headers_follow_option() {
    // GIVEN: One mock per header variant
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("sec-fetch-site", "none"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"with-headers"}]"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(|request: &Request| !request.headers.contains_key("sec-fetch-site"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"plain"}]"#))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Listing once with and once without browser headers
    let with_headers = ModelCatalogClient::new(upstream(true))
        .list_models(&credentials(&server))
        .await;
    let plain = ModelCatalogClient::new(upstream(false))
        .list_models(&credentials(&server))
        .await;

    // THEN: Each hit its own mock
    assert_eq!(with_headers.models[0].id, "with-headers");
    assert_eq!(plain.models[0].id, "plain");
}

#[tokio::test]
async fn given_custom_fallback_when_listing_fails_then_injected_catalog_is_used() {
    let catalog = ModelCatalogClient::with_fallback(
        upstream(true),
        vec![
            translate_core::models::ModelDescriptor::new("z-local", None),
            translate_core::models::ModelDescriptor::new("a-local", None),
        ],
    );

    let listing = catalog.list_models(&UpstreamCredentials::default()).await;

    let ids: Vec<&str> = listing.models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a-local", "z-local"]);
}
