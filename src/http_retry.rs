//! Manifest text fetching with bounded retry.
//!
//! Used by the analyze endpoint and by [`HttpManifestFetcher`], the
//! production [`ManifestFetcher`] behind the playback controller's
//! best-effort analysis.

use crate::error::{MediaLensError, Result};
use crate::player::ManifestFetcher;
use async_trait::async_trait;
use reqwest::{Client, Response, header::ACCESS_CONTROL_ALLOW_ORIGIN};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of fetch attempts (1 initial + 1 retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default backoff between attempts in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// UTF-8 byte order mark, tolerated at the start of manifest bodies.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Configuration for [`fetch_with_retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (minimum 1; 0 is treated as 1).
    pub max_attempts: u32,
    /// Sleep duration between consecutive attempts.
    pub backoff: Duration,
    /// Optional per-request timeout applied to each individual attempt.
    pub timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            timeout: None,
        }
    }
}

/// Fetch a URL via HTTP GET, retrying failed attempts after `config.backoff`.
///
/// Returns the first 2xx [`Response`], or the error of the last attempt.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    config: &RetryConfig,
) -> std::result::Result<Response, reqwest::Error> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let mut request = client.get(url);
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }

        let outcome = match request.send().await {
            Ok(response) => response.error_for_status(),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(response) => return Ok(response),
            Err(e) if attempt >= max_attempts => {
                warn!(
                    "Manifest fetch failed for {} (attempt {}/{}): {}",
                    url, attempt, max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "Manifest fetch failed for {} (attempt {}/{}): {}, retrying in {}ms",
                    url,
                    attempt,
                    max_attempts,
                    e,
                    config.backoff.as_millis()
                );
                tokio::time::sleep(config.backoff).await;
                attempt += 1;
            }
        }
    }
}

/// Decode a fetched manifest body as text.
///
/// A leading BOM is stripped. Bytes that are not valid UTF-8 are the one
/// case where analysis cannot proceed at all.
pub fn decode_manifest_text(bytes: &[u8]) -> Result<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    String::from_utf8(body.to_vec()).map_err(|e| {
        MediaLensError::ManifestUnreadable(format!(
            "body is not valid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Whether a browser on another origin may read the manifest directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorsStatus {
    /// `Access-Control-Allow-Origin` is `*` or names the requesting origin
    Allowed,
    /// Header missing or naming some other origin
    Blocked,
}

impl CorsStatus {
    pub fn classify(allow_origin: Option<&str>, page_origin: &str) -> Self {
        match allow_origin.map(str::trim) {
            Some("*") => CorsStatus::Allowed,
            Some(origin) if origin.trim_end_matches('/') == page_origin.trim_end_matches('/') => {
                CorsStatus::Allowed
            }
            _ => CorsStatus::Blocked,
        }
    }
}

/// Decoded manifest text plus the origin's CORS answer.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub text: String,
    /// Raw `Access-Control-Allow-Origin` value, if the origin sent one
    pub allow_origin: Option<String>,
}

/// Fetch a manifest, keeping the origin's `Access-Control-Allow-Origin`.
pub async fn fetch_manifest(client: &Client, url: &str, config: &RetryConfig) -> Result<FetchedManifest> {
    let response = fetch_with_retry(client, url, config).await?;
    let allow_origin = response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;
    debug!("Fetched manifest {} ({} bytes)", url, bytes.len());

    Ok(FetchedManifest {
        text: decode_manifest_text(&bytes)?,
        allow_origin,
    })
}

/// Fetch a manifest and return its decoded text.
pub async fn fetch_manifest_text(client: &Client, url: &str, config: &RetryConfig) -> Result<String> {
    fetch_manifest(client, url, config).await.map(|fetched| fetched.text)
}

/// [`ManifestFetcher`] backed by a shared reqwest client.
#[derive(Clone, Debug)]
pub struct HttpManifestFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpManifestFetcher {
    pub fn new(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        fetch_manifest_text(&self.client, url, &self.retry).await
    }
}
