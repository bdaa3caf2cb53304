//! Canonical upstream URLs from user-supplied base URLs.
//!
//! Users paste anything from `""` to `api.example.com` to
//! `https://proxy.example.com/v1/models`. Resolution never fails and never
//! touches the network; a nonsensical base only shows up later as a
//! connection or parse failure.

use crate::{CHAT_COMPLETIONS_PATH, DEFAULT_BASE_URL, MODELS_PATH, VERSIONED_MODELS_PATH};

const HTTP_PREFIX: &str = "http";
const HTTPS_SCHEME: &str = "https://";
const VERSION_SUFFIX: &str = "/v1";

/// Upstream operation a URL is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `GET .../models`
    Models,
    /// `POST .../chat/completions`
    Chat,
}

/// Trim the base, fall back to the default when blank, and add a scheme when missing.
///
/// Anything already starting with `http` is taken to carry its own scheme.
pub fn normalize_base(base_url: &str) -> String {
    let trimmed = base_url.trim();

    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    if trimmed.starts_with(HTTP_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{HTTPS_SCHEME}{trimmed}")
    }
}

/// Resolve the absolute URL for `kind` against a user-supplied base.
///
/// # Examples
///
/// ```
/// use translate_core::endpoint::{EndpointKind, resolve};
///
/// assert_eq!(
///     resolve("", EndpointKind::Models),
///     "https://api.openai.com/v1/models"
/// );
/// assert_eq!(
///     resolve("my-host.example.com", EndpointKind::Models),
///     "https://my-host.example.com/v1/models"
/// );
/// assert_eq!(
///     resolve("https://proxy.example.com/v1", EndpointKind::Chat),
///     "https://proxy.example.com/v1/chat/completions"
/// );
/// ```
pub fn resolve(base_url: &str, kind: EndpointKind) -> String {
    let base = normalize_base(base_url);

    match kind {
        EndpointKind::Models => {
            if base.contains(VERSIONED_MODELS_PATH) || base.contains(MODELS_PATH) {
                return base;
            }

            let base = base.trim_end_matches('/');
            if base.ends_with(VERSION_SUFFIX) {
                format!("{base}{MODELS_PATH}")
            } else {
                format!("{base}{VERSIONED_MODELS_PATH}")
            }
        }
        // The chat base is expected to carry its own version segment.
        EndpointKind::Chat => {
            format!("{}{CHAT_COMPLETIONS_PATH}", base.trim_end_matches('/'))
        }
    }
}
