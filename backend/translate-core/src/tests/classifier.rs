// Unit tests for the error classifier
// Rule order, message sanitizing, and the status mapping used by the HTTP layer

use crate::classifier::{
    ClassifiedError, ErrorKind, MAX_MESSAGE_CHARS, Operation, classify, sanitize_message,
};
use crate::error::UpstreamError;

use common::ErrorLocation;

use std::panic::Location;

const TRANSLATE: Operation<'static> = Operation::Translate {
    model: "gpt-4o-mini",
};

fn network(is_connect: bool, is_timeout: bool) -> UpstreamError {
    UpstreamError::Network {
        message: String::from("error sending request"),
        is_connect,
        is_timeout,
        location: ErrorLocation::from(Location::caller()),
    }
}

fn http(status: u16, body: &str) -> UpstreamError {
    UpstreamError::from_http_response(status, body)
}

/// **VALUE**: Verifies the fixed status rules (401, 403, 404, 429).
///
/// **WHY THIS MATTERS**: These four cover almost every real misconfiguration: wrong key,
/// wrong proxy, wrong path, quota. Users act on the message, so it must be the right one.
///
/// **BUG THIS CATCHES**: Would catch a reordered match that lets a generic arm win.
#[test]
fn given_known_statuses_when_classified_then_maps_to_fixed_kinds() {
    let cases = [
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::EndpointNotFound),
        (429, ErrorKind::RateLimited),
    ];

    for (status, expected) in cases {
        let classified = classify(&http(status, "{}"), TRANSLATE);
        assert_eq!(classified.kind, expected, "status {status}");
        assert!(!classified.message.is_empty());
    }
}

/// **VALUE**: Verifies that WAF block pages are told apart from plain 403s.
///
/// **WHY THIS MATTERS**: A Cloudflare block means "your base URL is behind a firewall", not
/// "your key lacks permission". The advice differs.
///
/// **BUG THIS CATCHES**: Would catch case-sensitive matching missing `Cloudflare`.
#[test]
fn given_forbidden_with_waf_body_when_classified_then_endpoint_blocked() {
    let cloudflare = classify(&http(403, "<title>Attention Required! | Cloudflare</title>"), TRANSLATE);
    let blocked = classify(&http(403, "Request blocked"), Operation::ListModels);

    assert_eq!(cloudflare.kind, ErrorKind::EndpointBlocked);
    assert_eq!(blocked.kind, ErrorKind::EndpointBlocked);
}

#[test]
fn given_not_found_when_classified_then_message_depends_on_operation() {
    let listing = classify(&http(404, "Not Found"), Operation::ListModels);
    let chat = classify(&http(404, "Not Found"), TRANSLATE);

    assert_eq!(listing.kind, ErrorKind::EndpointNotFound);
    assert_eq!(chat.kind, ErrorKind::EndpointNotFound);
    assert!(listing.message.contains("model listing"));
    assert!(chat.message.contains("Base URL"));
}

/// **VALUE**: Verifies the narrowed model heuristic: only 400/404 bodies during translation.
///
/// **WHY THIS MATTERS**: Upstream bodies mention "model" all the time (rate limit texts,
/// server errors). Only a rejected request that names the model means the model is wrong.
///
/// **BUG THIS CATCHES**: Would catch a 500 "model overloaded" being reported as an unknown
/// model, or the requested model id missing from the message.
#[test]
fn given_model_mentions_when_classified_then_only_client_rejections_are_model_unavailable() {
    let not_found = classify(
        &http(404, r#"{"error":{"code":"model_not_found"}}"#),
        TRANSLATE,
    );
    let bad_request = classify(&http(400, "invalid model id"), TRANSLATE);
    let overloaded = classify(&http(503, "The model is overloaded"), TRANSLATE);
    let rate_limited = classify(&http(429, "model rate limit"), TRANSLATE);

    assert_eq!(not_found.kind, ErrorKind::ModelUnavailable);
    assert!(not_found.message.contains("gpt-4o-mini"));
    assert_eq!(bad_request.kind, ErrorKind::ModelUnavailable);
    assert_eq!(overloaded.kind, ErrorKind::Unknown);
    assert_eq!(rate_limited.kind, ErrorKind::RateLimited);
}

#[test]
fn given_model_mention_while_listing_when_classified_then_not_model_unavailable() {
    let classified = classify(&http(404, "no models route"), Operation::ListModels);

    assert_eq!(classified.kind, ErrorKind::EndpointNotFound);
}

#[test]
fn given_transport_failures_when_classified_then_split_by_category() {
    assert_eq!(
        classify(&network(true, false), TRANSLATE).kind,
        ErrorKind::Unreachable
    );
    assert_eq!(
        classify(&network(false, true), TRANSLATE).kind,
        ErrorKind::NetworkError
    );
    assert_eq!(
        classify(&network(false, false), Operation::ListModels).kind,
        ErrorKind::NetworkError
    );
}

#[test]
fn given_parse_failures_when_classified_then_format_kinds() {
    let parse_error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
    let json = UpstreamError::invalid_json(&parse_error, "<html>");
    let shape = UpstreamError::unexpected_format("object with keys: foo");

    assert_eq!(
        classify(&json, Operation::ListModels).kind,
        ErrorKind::BadResponseFormat
    );
    assert_eq!(
        classify(&shape, Operation::ListModels).kind,
        ErrorKind::UnexpectedFormat
    );
}

#[test]
fn given_malformed_base_url_when_classified_then_unreachable() {
    let parse_error = url::Url::parse("https://exa mple.com").unwrap_err();

    let classified = classify(&UpstreamError::from(parse_error), TRANSLATE);

    assert_eq!(classified.kind, ErrorKind::Unreachable);
}

/// **VALUE**: Verifies that HTML error pages never reach the user verbatim.
///
/// **WHY THIS MATTERS**: Gateways answer 502/520 with full HTML documents. Displaying those
/// dumps markup into the toast and can leak infrastructure details.
///
/// **BUG THIS CATCHES**: Would catch a non-multiline regex leaving half the document behind,
/// or the `HTTP 502:` prefix surviving.
#[test]
fn given_html_error_body_when_classified_then_html_is_stripped() {
    let body = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>502</title></head>\n<body>Bad gateway</body>\n</html>\nupstream connect error";

    let classified = classify(&http(502, body), TRANSLATE);

    assert_eq!(classified.kind, ErrorKind::Unknown);
    assert_eq!(classified.message, "upstream connect error");
    assert!(!classified.message.contains('<'));
}

#[test]
fn given_only_html_body_when_classified_then_falls_back_to_generic_message() {
    let body = "<!DOCTYPE html><html><body>oops</body></html>";

    let translate = classify(&http(500, body), TRANSLATE);
    let listing = classify(&http(500, body), Operation::ListModels);

    // "HTTP 500:" alone is stripped, leaving nothing
    assert_eq!(translate.message, "Translation failed");
    assert_eq!(listing.message, "Failed to fetch models");
}

/// **VALUE**: Verifies that a gateway page cut off before `</html>` is still hidden.
///
/// **WHY THIS MATTERS**: Proxies truncate or stream error pages; a document without its
/// closing tag must not be shown as the error text.
///
/// **BUG THIS CATCHES**: Would catch stripping that only handles complete documents.
#[test]
fn given_unterminated_html_body_when_classified_then_generic_message() {
    // GIVEN: An nginx 502 page that never closes
    let body = "<!DOCTYPE html><html><head><title>502 Bad Gateway</title></head><body><center><h1>502 Bad Gateway</h1></center><hr><center>nginx</center>";

    // WHEN: Classifying for both operations
    let translate = classify(&http(502, body), TRANSLATE);
    let listing = classify(&http(502, body), Operation::ListModels);

    // THEN: No markup, generic wording
    assert_eq!(translate.kind, ErrorKind::Unknown);
    assert_eq!(translate.message, "Translation failed");
    assert_eq!(listing.message, "Failed to fetch models");
}

#[test]
fn given_text_before_unterminated_html_when_sanitized_then_text_kept() {
    assert_eq!(
        sanitize_message("HTTP 503: upstream timeout <html><body>Service Unavailable"),
        Some(String::from("upstream timeout"))
    );
}

#[test]
fn given_stray_markup_when_sanitized_then_none() {
    assert_eq!(sanitize_message("HTTP 502: <center>nginx</center>"), None);
    assert_eq!(sanitize_message("<h1>Bad Gateway"), None);
}

#[test]
fn given_long_message_when_sanitized_then_bounded_to_max_chars() {
    let long = format!("HTTP 500: {}", "é".repeat(500));

    let sanitized = sanitize_message(&long).expect("something left");

    assert!(sanitized.chars().count() <= MAX_MESSAGE_CHARS);
    assert!(sanitized.ends_with("..."));
    assert!(!sanitized.starts_with("HTTP"));
}

#[test]
fn given_short_message_when_sanitized_then_kept_as_is() {
    assert_eq!(
        sanitize_message("HTTP 500: Internal error"),
        Some(String::from("Internal error"))
    );
    assert_eq!(sanitize_message("   "), None);
}

#[test]
fn given_error_kinds_when_mapping_status_then_only_caller_mistakes_are_400() {
    assert_eq!(ClassifiedError::invalid_input().kind.http_status(), 400);
    assert_eq!(ClassifiedError::missing_credential().kind.http_status(), 400);
    assert_eq!(ErrorKind::Unauthorized.http_status(), 500);
    assert_eq!(ErrorKind::EmptyResult.http_status(), 500);
}

#[test]
fn given_classified_error_when_displayed_then_shows_message_only() {
    let error = ClassifiedError::empty_result();

    assert_eq!(error.to_string(), "Failed to get translation");
    let json = serde_json::to_value(&error).expect("serializable");
    assert_eq!(json["kind"], "EmptyResult");
}
