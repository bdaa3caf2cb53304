// Unit tests for translation helpers
// The two call paths against a live mock server are in integration_tests/translation.rs

use crate::classifier::ErrorKind;
use crate::translation::{build_prompt, extract_translation, with_fallback};

use std::cell::Cell;

#[test]
fn given_languages_and_text_when_building_prompt_then_text_follows_verbatim() {
    let prompt = build_prompt("English", "French", "Hello \"world\"\n{braces}");

    assert!(prompt.starts_with("Please translate the following text from English to French."));
    assert!(prompt.contains("Only return the translated text"));
    assert!(prompt.ends_with("\n\nHello \"world\"\n{braces}"));
}

/// **VALUE**: Verifies the fallback combinator never runs the fallback after a success.
///
/// **WHY THIS MATTERS**: A second upstream call after a success would double-bill the user
/// and could return a different translation.
///
/// **BUG THIS CATCHES**: Would catch the combinator being rewritten as "run both, pick one".
#[tokio::test]
async fn given_primary_success_when_combined_then_fallback_not_called() {
    let fallback_calls = Cell::new(0);

    let result: Result<&str, &str> = with_fallback(async { Ok("primary") }, |_| {
        fallback_calls.set(fallback_calls.get() + 1);
        async { Ok("fallback") }
    })
    .await;

    assert_eq!(result, Ok("primary"));
    assert_eq!(fallback_calls.get(), 0);
}

/// **VALUE**: Verifies the fallback receives the primary's error and runs exactly once.
///
/// **WHY THIS MATTERS**: The fallback logs why the primary failed; its own failure is what
/// the caller sees.
///
/// **BUG THIS CATCHES**: Would catch a loop (retrying the fallback) or the primary error
/// being returned instead of the fallback's.
#[tokio::test]
async fn given_primary_failure_when_combined_then_fallback_runs_once_with_error() {
    let fallback_calls = Cell::new(0);

    let result: Result<&str, String> = with_fallback(async { Err(String::from("sdk")) }, |err| {
        fallback_calls.set(fallback_calls.get() + 1);
        async move { Err(format!("raw after {err}")) }
    })
    .await;

    assert_eq!(result, Err(String::from("raw after sdk")));
    assert_eq!(fallback_calls.get(), 1);
}

#[test]
fn given_padded_content_when_extracted_then_trimmed() {
    let result = extract_translation(Some(String::from("  Bonjour \n"))).expect("content");

    assert_eq!(result.translated_text, "Bonjour");
}

#[test]
fn given_missing_or_blank_content_when_extracted_then_empty_result() {
    for content in [None, Some(String::new()), Some(String::from(" \n\t "))] {
        let error = extract_translation(content).expect_err("empty");
        assert_eq!(error.kind, ErrorKind::EmptyResult);
    }
}

#[test]
fn given_result_when_serialized_then_uses_camel_case_field() {
    let result = extract_translation(Some(String::from("Hola"))).expect("content");

    let json = serde_json::to_string(&result).expect("serializable");

    assert_eq!(json, r#"{"translatedText":"Hola"}"#);
}
