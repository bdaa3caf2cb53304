// Unit tests for model catalog parsing
// Network behaviour is covered in integration_tests/models.rs

use crate::error::UpstreamError;
use crate::models::{
    FALLBACK_MODEL_IDS, ModelDescriptor, ModelsShape, fallback_catalog, parse_models, sort_models,
};

use serde_json::json;

fn ids(models: &[ModelDescriptor]) -> Vec<&str> {
    models.iter().map(|m| m.id.as_str()).collect()
}

/// **VALUE**: Verifies the standard OpenAI shape is parsed and sorted by id.
///
/// **WHY THIS MATTERS**: The model dropdown is built straight from this list. Upstream order
/// is arbitrary (often creation time), which makes long lists unusable.
///
/// **BUG THIS CATCHES**: Would catch the sort being skipped or applied before parsing.
#[test]
fn given_standard_shape_when_parsed_then_sorted_by_id() {
    let body = r#"{"object":"list","data":[{"id":"b","object":"model"},{"id":"a","object":"model"}]}"#;

    let models = parse_models(body).expect("standard shape");

    assert_eq!(ids(&models), vec!["a", "b"]);
}

/// **VALUE**: Verifies all three accepted shapes and their priority.
///
/// **WHY THIS MATTERS**: Compatible servers disagree on the envelope. Some return a bare
/// array, some nest under `models`. A body carrying both `data` and `models` must use `data`.
///
/// **BUG THIS CATCHES**: Would catch the acceptance order changing silently.
#[test]
fn given_each_shape_when_detected_then_matches_acceptance_order() {
    let standard = json!({"data": [{"id": "x"}], "models": [{"id": "y"}]});
    let bare = json!([{"id": "x"}]);
    let wrapped = json!({"models": [{"id": "y"}]});
    let other = json!({"result": []});

    assert_eq!(
        ModelsShape::detect(&standard).map(|(shape, _)| shape),
        Some(ModelsShape::Standard)
    );
    assert_eq!(
        ModelsShape::detect(&bare).map(|(shape, _)| shape),
        Some(ModelsShape::BareArray)
    );
    assert_eq!(
        ModelsShape::detect(&wrapped).map(|(shape, _)| shape),
        Some(ModelsShape::Wrapped)
    );
    assert!(ModelsShape::detect(&other).is_none());
}

#[test]
fn given_bare_array_and_wrapped_bodies_when_parsed_then_both_accepted() {
    let bare = parse_models(r#"[{"id":"m2"},{"id":"m1"}]"#).expect("bare array");
    let wrapped = parse_models(r#"{"models":[{"id":"z","owned_by":"me","created":1700000000}]}"#)
        .expect("wrapped");

    assert_eq!(ids(&bare), vec!["m1", "m2"]);
    assert_eq!(wrapped[0].owned_by.as_deref(), Some("me"));
    assert_eq!(wrapped[0].created, Some(1_700_000_000));
    assert_eq!(wrapped[0].object, "model", "object defaults to 'model'");
}

#[test]
fn given_non_json_body_when_parsed_then_json_error_with_excerpt() {
    let result = parse_models("<html>gateway timeout</html>");

    match result {
        Err(UpstreamError::Json { excerpt, .. }) => assert!(excerpt.contains("gateway")),
        other => panic!("Expected Json error, got {other:?}"),
    }
}

#[test]
fn given_unknown_object_when_parsed_then_unexpected_format_lists_keys() {
    let result = parse_models(r#"{"result":[],"status":"ok"}"#);

    match result {
        Err(UpstreamError::UnexpectedFormat { message, .. }) => {
            assert!(message.contains("result"));
            assert!(message.contains("status"));
        }
        other => panic!("Expected UnexpectedFormat, got {other:?}"),
    }
}

#[test]
fn given_entry_without_id_when_parsed_then_unexpected_format() {
    let result = parse_models(r#"{"data":[{"name":"no id"}]}"#);

    assert!(matches!(result, Err(UpstreamError::UnexpectedFormat { .. })));
}

/// **VALUE**: Verifies one odd entry does not discard a whole upstream listing.
///
/// **WHY THIS MATTERS**: Compatible providers emit `created` as floats or strings, or
/// include entries without an id. The user should still see every usable model.
///
/// **BUG THIS CATCHES**: Would catch strict `i64` decoding or all-or-nothing entry parsing
/// sending the user to the fallback catalog.
#[test]
fn given_loose_created_and_bad_entry_when_parsed_then_usable_entries_kept() {
    // GIVEN: Float and string timestamps plus an entry without an id
    let body = r#"{"data":[
        {"id":"b","created":1700000000.5},
        {"name":"no id"},
        {"id":"a","created":"1690000000"},
        {"id":"c","created":{"unexpected":true}}
    ]}"#;

    // WHEN: Parsing
    let models = parse_models(body).expect("usable entries");

    // THEN: Three models, sorted, timestamps read where possible
    assert_eq!(ids(&models), vec!["a", "b", "c"]);
    assert_eq!(models[0].created, Some(1_690_000_000));
    assert_eq!(models[1].created, Some(1_700_000_000));
    assert_eq!(models[2].created, None);
}

#[test]
fn given_empty_list_when_parsed_then_empty_without_error() {
    let models = parse_models(r#"{"data":[]}"#).expect("empty list is valid");

    assert!(models.is_empty());
}

/// **VALUE**: Verifies sorting is idempotent on parsed output.
///
/// **WHY THIS MATTERS**: The UI may re-sort after merging; a listing that is already sorted
/// must come out identical.
///
/// **BUG THIS CATCHES**: Would catch an unstable or locale-dependent comparator.
#[test]
fn given_parsed_models_when_sorted_again_then_unchanged() {
    let models = parse_models(r#"[{"id":"gpt-4o"},{"id":"Claude"},{"id":"gpt-4"},{"id":"a-1"}]"#)
        .expect("parsed");

    let mut resorted = models.clone();
    sort_models(&mut resorted);

    assert_eq!(models, resorted);
    assert_eq!(ids(&models), vec!["Claude", "a-1", "gpt-4", "gpt-4o"]);
}

#[test]
fn given_fallback_catalog_then_has_four_sorted_openai_models() {
    let catalog = fallback_catalog();

    assert_eq!(catalog.len(), FALLBACK_MODEL_IDS.len());
    assert_eq!(
        ids(&catalog),
        vec!["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview", "gpt-4o"]
    );
    assert!(catalog.iter().all(|m| m.owned_by.as_deref() == Some("openai")));
}

#[test]
fn given_descriptor_without_optionals_when_serialized_then_fields_omitted() {
    let json = serde_json::to_value(ModelDescriptor::new("gpt-4", None)).expect("serializable");

    assert_eq!(json, json!({"id": "gpt-4", "object": "model"}));
}
