//! Shared HTTP plumbing for talking to OpenAI-compatible endpoints.

use crate::DEFAULT_MODEL;
use crate::error::UpstreamError;

use common::{HttpStatusCode, RedactedApiKey};

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response};

const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(60);
const LOGGED_BODY_CHARS: usize = 500;
const JSON_CONTENT_TYPE: &str = "application/json";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

const COMMON_BROWSER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", BROWSER_USER_AGENT),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
];

const LISTING_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, */*"),
    ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ("sec-fetch-site", "none"),
];

const SDK_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "zh-CN,zh;q=0.9"),
    ("sec-fetch-site", "cross-site"),
];

const DIRECT_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "zh-CN,zh;q=0.9"),
    ("origin", "https://chat.openai.com"),
    ("referer", "https://chat.openai.com/"),
    ("sec-fetch-site", "same-site"),
];

/// Which browser-like header set a request should carry.
///
/// Some upstream proxies sit behind WAFs that reject obvious server-to-server
/// traffic. These headers only exist to get past them and can be switched off
/// with [`UpstreamOptions::browser_headers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserProfile {
    /// Model listing.
    Listing,
    /// Primary chat completion path.
    Sdk,
    /// Raw-HTTP chat completion fallback.
    Direct,
}

impl BrowserProfile {
    fn headers(self) -> &'static [(&'static str, &'static str)] {
        match self {
            BrowserProfile::Listing => LISTING_HEADERS,
            BrowserProfile::Sdk => SDK_HEADERS,
            BrowserProfile::Direct => DIRECT_HEADERS,
        }
    }
}

/// Knobs for every upstream call made through an [`UpstreamClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOptions {
    /// Send browser-like headers (User-Agent, Sec-Fetch-*).
    pub browser_headers: bool,
    pub request_timeout: Duration,
    /// Model used when a translation request names none.
    pub default_model: String,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            browser_headers: true,
            request_timeout: DEFAULT_TIMEOUT_DURATION,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Per-call upstream credentials.
///
/// Built fresh for each request and dropped with it; the key is zeroized on drop.
#[derive(Debug, Clone, Default)]
pub struct UpstreamCredentials {
    api_key: Option<RedactedApiKey>,
    base_url: Option<String>,
}

impl UpstreamCredentials {
    /// Wrap raw user input. A blank key or base URL is treated as absent.
    pub fn new(api_key: &str, base_url: Option<&str>) -> Self {
        Self {
            api_key: RedactedApiKey::from_input(api_key),
            base_url: base_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    pub fn api_key(&self) -> Option<&RedactedApiKey> {
        self.api_key.as_ref()
    }

    /// The user-supplied base URL, or `""` to let the resolver pick the default.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("")
    }
}

/// A reqwest client plus the options every upstream call shares.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    options: UpstreamOptions,
}

impl UpstreamClient {
    pub fn new(options: UpstreamOptions) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &UpstreamOptions {
        &self.options
    }

    /// Start an authenticated request with the profile's headers applied.
    pub(crate) fn request(
        &self,
        method: Method,
        url: impl IntoUrl,
        api_key: &RedactedApiKey,
        profile: BrowserProfile,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, api_key.bearer())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        if self.options.browser_headers {
            for (name, value) in COMMON_BROWSER_HEADERS.iter().chain(profile.headers()) {
                request = request.header(*name, *value);
            }
        } else {
            request = request.header(ACCEPT, JSON_CONTENT_TYPE);
        }

        request
    }
}

/// Read the whole body as text, turning non-2xx statuses into [`UpstreamError::Http`].
///
/// Bodies are read before any JSON parsing so that HTML error pages from
/// gateways end up in the error instead of a parse failure.
pub(crate) async fn read_success_body(response: Response) -> Result<String, UpstreamError> {
    let status = HttpStatusCode::from(response.status().as_u16());
    let body = response.text().await?;

    debug!("Upstream responded with status {status}");

    if status.is_success() {
        return Ok(body);
    }

    let excerpt: String = body.chars().take(LOGGED_BODY_CHARS).collect();
    if status.is_server_error() {
        warn!("Upstream server error {status} (first {LOGGED_BODY_CHARS} chars): {excerpt}");
    } else {
        debug!("Upstream error body (first {LOGGED_BODY_CHARS} chars): {excerpt}");
    }

    Err(UpstreamError::from_http_response(status.0, body))
}
