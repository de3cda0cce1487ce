//! HTTP page fetching with exponential backoff retry logic.
//!
//! All listing and detail pages go through [`fetch_page`], which issues a
//! GET with browser-like headers and retries transient failures. The source
//! sites serve plain server-rendered HTML but at least one of them rejects
//! requests without a realistic User-Agent.
//!
//! # Retry Strategy
//!
//! - Maximum 5 attempts per URL
//! - Exponential backoff starting at 1.5 seconds, doubling per attempt
//! - Delay capped at 20 seconds
//! - Non-2xx responses and transport errors are both retried; whichever
//!   failure is left after the final attempt becomes the fatal
//!   [`FetchError`]

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Maximum fetch attempts per URL before the failure becomes fatal.
pub const MAX_ATTEMPTS: usize = 5;

/// Base delay for the first backoff interval.
const BASE_DELAY: Duration = Duration::from_millis(1500);

/// Cap on the delay between attempts.
const MAX_DELAY: Duration = Duration::from_secs(20);

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// A page fetch that failed for good.
///
/// Transient failures are retried inside [`fetch_page`]; only retry
/// exhaustion (or an unusable client/URL) surfaces as this type. The caller
/// decides whether a fatal fetch aborts the whole crawl or skips the page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A URL could not be parsed or resolved.
    #[error("invalid URL {url}: {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The server kept answering with a non-2xx status.
    #[error("HTTP {status} fetching {url} after {attempts} attempts")]
    Status {
        url: String,
        status: StatusCode,
        attempts: usize,
    },

    /// Connection, timeout, or truncated-body errors exhausted the retries.
    #[error("fetching {url} failed after {attempts} attempts: {source}")]
    Transport {
        url: String,
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },
}

/// What went wrong on a single attempt.
enum AttemptError {
    Status(StatusCode),
    Transport(reqwest::Error),
}

impl AttemptError {
    fn into_fatal(self, url: &str, attempts: usize) -> FetchError {
        match self {
            AttemptError::Status(status) => FetchError::Status {
                url: url.to_string(),
                status,
                attempts,
            },
            AttemptError::Transport(source) => FetchError::Transport {
                url: url.to_string(),
                attempts,
                source,
            },
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Status(status) => write!(f, "HTTP {status}"),
            AttemptError::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// Build the HTTP client shared by one crawl.
///
/// Bounded connect timeout, longer read timeout: listing pages on these
/// sites can be slow to stream but must not hang the crawl indefinitely.
pub fn build_client() -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(FetchError::Client)
}

/// Compute the backoff delay before retrying after `attempt` failures.
///
/// `min(20s, 1.5s * 2^(attempt - 1))`.
fn backoff_delay(attempt: usize) -> Duration {
    let doubled = BASE_DELAY.saturating_mul(1u32 << (attempt.saturating_sub(1)).min(16));
    doubled.min(MAX_DELAY)
}

/// Fetch one page and return its body text.
///
/// Retries transient failures per the module-level strategy. Callers parse
/// the returned body with `scraper::Html::parse_document`.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let total_t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        match try_fetch(client, url).await {
            Ok(body) => {
                debug!(
                    bytes = body.len(),
                    attempt,
                    elapsed_ms = total_t0.elapsed().as_millis() as u64,
                    "Fetched page"
                );
                return Ok(body);
            }
            Err(e) if attempt >= MAX_ATTEMPTS => {
                error!(
                    attempt,
                    max = MAX_ATTEMPTS,
                    elapsed_ms = total_t0.elapsed().as_millis() as u64,
                    error = %e,
                    %url,
                    "fetch exhausted retries"
                );
                return Err(e.into_fatal(url, attempt));
            }
            Err(e) => {
                let delay = backoff_delay(attempt);
                warn!(
                    attempt,
                    max = MAX_ATTEMPTS,
                    ?delay,
                    error = %e,
                    %url,
                    "transient fetch error; backing off"
                );
                sleep(delay).await;
            }
        }
    }
}

/// One GET attempt: transport errors, non-2xx statuses, and body-read
/// failures are all reported for the caller's retry decision.
async fn try_fetch(client: &Client, url: &str) -> Result<String, AttemptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(AttemptError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptError::Status(status));
    }

    response.text().await.map_err(AttemptError::Transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_schedule() {
        assert_eq!(backoff_delay(1), Duration::from_millis(1500));
        assert_eq!(backoff_delay(2), Duration::from_secs(3));
        assert_eq!(backoff_delay(3), Duration::from_secs(6));
        assert_eq!(backoff_delay(4), Duration::from_secs(12));
        // Capped at 20s from the fifth attempt on
        assert_eq!(backoff_delay(5), Duration::from_secs(20));
        assert_eq!(backoff_delay(9), Duration::from_secs(20));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://example.com/page/2".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            attempts: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("https://example.com/page/2"));
    }
}
