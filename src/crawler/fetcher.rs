//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for homepage, category and question pages
//! - Retry with a fixed delay for any failed attempt
//! - Decoding bodies by header or `<meta>` charset

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::FetchError;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// How often and how patiently a URL is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Pause before every attempt after the first
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy; any 3xx that
/// reqwest does not resolve is surfaced as the final response.
///
/// # Arguments
///
/// * `crawler` - Supplies the request timeout
/// * `user_agent` - Supplies the User-Agent header value
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.as_str())
        .timeout(Duration::from_millis(crawler.request_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests with a fixed retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from an existing client
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and retry policy from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(crawler, user_agent)?;
        Ok(Self::new(client, RetryPolicy::from_config(crawler)))
    }

    /// Fetches a URL, retrying on any failure
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx / 3xx | Return the page |
    /// | 4xx / 5xx | Retry after the policy delay |
    /// | Timeout, connection or body error | Retry after the policy delay |
    /// | Final attempt fails | Return `FetchError` with the last cause |
    ///
    /// There is no delay before the first attempt.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.try_fetch(url).await {
                Ok(page) => {
                    tracing::debug!(
                        "Fetched {} (status {}, {} bytes, attempt {})",
                        url,
                        page.status_code,
                        page.body.len(),
                        attempt
                    );
                    return Ok(page);
                }
                Err(e) => {
                    tracing::warn!("Attempt {} for {} failed: {}", attempt, url, e);

                    if attempt >= self.policy.max_attempts {
                        return Err(FetchError {
                            url: url.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }

                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }
    }

    /// One GET request; error statuses are turned into errors
    async fn try_fetch(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        Ok(FetchedPage {
            status_code,
            body: decode_body(&bytes, content_type.as_deref()),
        })
    }
}

/// How far into the body a `<meta>` charset declaration is looked for
const META_PRESCAN_BYTES: usize = 1024;

/// Decodes a response body to text
///
/// # Encoding Resolution
///
/// 1. A byte order mark
/// 2. The `charset` parameter of the Content-Type header
/// 3. A `<meta charset>` or `<meta http-equiv>` declaration near the top
/// 4. UTF-8
///
/// Undecodable sequences become U+FFFD.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(header_charset)
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    // decode() lets a BOM override the chosen encoding
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Body is not valid {}; replaced bad sequences", used.name());
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    let lowered = content_type.to_ascii_lowercase();
    charset_label(&lowered).and_then(|label| Encoding::for_label(label.as_bytes()))
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let end = tag.find('>').unwrap_or(tag.len());
        if let Some(encoding) =
            charset_label(&tag[..end]).and_then(|label| Encoding::for_label(label.as_bytes()))
        {
            return Some(encoding);
        }
        rest = &tag[end..];
    }

    None
}

/// Value following `charset=`, without quotes
fn charset_label(text: &str) -> Option<&str> {
    let start = text.find("charset")? + "charset".len();
    let value = text[start..].trim_start().strip_prefix('=')?.trim_start();
    let value = value.trim_start_matches(['"', '\'']);
    let end = value
        .find(|c: char| matches!(c, '"' | '\'' | ';' | '>' | '/') || c.is_whitespace())
        .unwrap_or(value.len());

    let label = &value[..end];
    (!label.is_empty()).then_some(label)
}
