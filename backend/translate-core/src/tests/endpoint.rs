// Unit tests for the endpoint resolver
// Pure string work, no network

use crate::endpoint::{EndpointKind, normalize_base, resolve};

/// **VALUE**: Verifies that blank base URLs fall back to the official endpoint.
///
/// **WHY THIS MATTERS**: The settings form sends `""` or `"   "` when the user never
/// configured a proxy. Those must still reach a working endpoint.
///
/// **BUG THIS CATCHES**: Would catch whitespace not being trimmed before the emptiness check,
/// which produces `https://   /v1/models`.
#[test]
fn given_blank_base_url_when_resolving_then_uses_default_endpoint() {
    for blank in ["", "   ", "\t\n"] {
        assert_eq!(
            resolve(blank, EndpointKind::Models),
            "https://api.openai.com/v1/models"
        );
        assert_eq!(
            resolve(blank, EndpointKind::Chat),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}

/// **VALUE**: Verifies that a full models URL is passed through untouched.
///
/// **WHY THIS MATTERS**: Users often paste the exact listing URL from provider docs.
/// Appending another path segment would produce `/v1/models/v1/models`.
///
/// **BUG THIS CATCHES**: Would catch the "already contains" checks being dropped or reordered
/// after the `/v1` suffix check.
#[test]
fn given_base_with_models_path_when_resolving_models_then_returns_unchanged() {
    let full = "https://proxy.example.com/v1/models";
    assert_eq!(resolve(full, EndpointKind::Models), full);

    let unversioned = "https://proxy.example.com/api/models";
    assert_eq!(resolve(unversioned, EndpointKind::Models), unversioned);
}

#[test]
fn given_base_ending_in_version_when_resolving_models_then_appends_models() {
    assert_eq!(
        resolve("https://proxy.example.com/v1", EndpointKind::Models),
        "https://proxy.example.com/v1/models"
    );
    assert_eq!(
        resolve("https://proxy.example.com/v1/", EndpointKind::Models),
        "https://proxy.example.com/v1/models"
    );
}

#[test]
fn given_bare_host_when_resolving_models_then_appends_versioned_path() {
    assert_eq!(
        resolve("https://proxy.example.com", EndpointKind::Models),
        "https://proxy.example.com/v1/models"
    );
}

/// **VALUE**: Verifies that a scheme-less base gets `https://`.
///
/// **WHY THIS MATTERS**: `my-host.example.com` is the most common thing users type. Without a
/// scheme, reqwest refuses the URL and the user sees a confusing network error.
///
/// **BUG THIS CATCHES**: Would catch the scheme being added only for one endpoint kind.
#[test]
fn given_base_without_scheme_when_resolving_then_prefixes_https() {
    let models = resolve("my-host.example.com", EndpointKind::Models);
    let chat = resolve("  my-host.example.com/v1 ", EndpointKind::Chat);

    assert!(models.starts_with("https://"));
    assert_eq!(models, "https://my-host.example.com/v1/models");
    assert_eq!(chat, "https://my-host.example.com/v1/chat/completions");
}

#[test]
fn given_plain_http_base_when_normalizing_then_keeps_scheme() {
    assert_eq!(
        normalize_base("http://localhost:11434/v1"),
        "http://localhost:11434/v1"
    );
}

/// **VALUE**: Verifies that chat resolution does not invent a version segment.
///
/// **WHY THIS MATTERS**: Compatible servers mount chat under their own prefixes
/// (`/api/v3`, `/openai/v1`). The base is taken to be complete.
///
/// **BUG THIS CATCHES**: Would catch someone reusing the models logic for chat.
#[test]
fn given_custom_prefix_when_resolving_chat_then_appends_only_chat_path() {
    assert_eq!(
        resolve("https://ark.example.com/api/v3/", EndpointKind::Chat),
        "https://ark.example.com/api/v3/chat/completions"
    );
}
