//! Pluggable HTTP transport.
//!
//! Everything that talks to the network goes through [`Fetch`], so callers can
//! swap the transport out entirely (custom auth, canned responses in tests).
//! [`HttpFetcher`] is the default, `reqwest`-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{Result, SiteFetchError};

/// User-Agent sent with every crawl request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.3";

/// Maximum number of redirects the default transport follows.
const MAX_REDIRECTS: usize = 10;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Per-request options handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInit {
    /// Request headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
}

impl RequestInit {
    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl Default for RequestInit {
    fn default() -> Self {
        Self {
            headers: vec![("user-agent".to_string(), USER_AGENT.to_string())],
        }
    }
}

/// A fully received HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Final URL, after any redirects.
    pub url: Url,
    /// Response headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Decoded response body.
    pub body: String,
}

impl FetchResponse {
    /// A response with the given final URL and status, no headers, empty body.
    pub fn new(url: Url, status: u16) -> Self {
        Self {
            status,
            url,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Builder: add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builder: set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status, empty if unknown.
    pub fn status_text(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }

    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The response body.
    pub fn text(&self) -> &str {
        &self.body
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// An HTTP GET transport.
///
/// Implementations follow redirects themselves and report the final URL in
/// [`FetchResponse::url`]. Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch `url` and return the complete response.
    async fn fetch(&self, url: &Url, init: &RequestInit) -> Result<FetchResponse>;
}

// ---------------------------------------------------------------------------
// Default transport
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`Fetch`] implementation.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a transport with the default redirect limit and timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Build a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| SiteFetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url, init: &RequestInit) -> Result<FetchResponse> {
        let mut request = self.client.get(url.as_str());
        for (name, value) in &init.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SiteFetchError::Network(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| SiteFetchError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(%url, status, final_url = %final_url, bytes = body.len(), "fetched");

        Ok(FetchResponse {
            status,
            url: final_url,
            headers,
            body,
        })
    }
}
