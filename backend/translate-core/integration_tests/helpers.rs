//! Test helpers for upstream integration tests.
//!
//! Every test talks to a `wiremock::MockServer` standing in for an
//! OpenAI-compatible endpoint mounted under `/v1`.

use translate_core::upstream::{UpstreamClient, UpstreamCredentials, UpstreamOptions};

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "sk-test-key-12345";
pub const BEARER: &str = "Bearer sk-test-key-12345";
pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const MODELS_PATH: &str = "/v1/models";

/// Test helper: upstream client with a short timeout.
pub fn upstream(browser_headers: bool) -> UpstreamClient {
    UpstreamClient::new(UpstreamOptions {
        browser_headers,
        request_timeout: Duration::from_secs(5),
        ..UpstreamOptions::default()
    })
    .expect("Failed to build upstream client")
}

/// Test helper: credentials pointing at the mock server's `/v1` base.
pub fn credentials(server: &MockServer) -> UpstreamCredentials {
    UpstreamCredentials::new(TEST_API_KEY, Some(&format!("{}/v1", server.uri())))
}

/// Test helper: a minimal chat completion body.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}
