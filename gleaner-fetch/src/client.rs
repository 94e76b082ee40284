//! Retrying HTTP transport with archive record/replay.

use std::time::Duration;

use gleaner_core::Credentials;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::archive::{ArchiveMode, ArchivedOutcome, RequestSignature};
use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Statuses retried by every client.
pub const DEFAULT_STATUS_FORCELIST: &[u16] = &[408, 423, 504];

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("gleaner/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Raw Response
// ============================================================================

/// A response body as returned to source clients, unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Final URL of the request.
    pub url: String,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// Returns the body text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Extension methods on [`Response`].
trait ResponseExt {
    /// Seconds from a numeric `Retry-After` header.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client shared by every source client.
///
/// Live requests are retried on the configured status set and on
/// connection/timeout failures. Depending on [`ArchiveMode`] the outcome of
/// each request, error statuses included, is written through to an archive,
/// or served from it with no network access at all.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    base_url: String,
    retry: RetryPolicy,
    status_forcelist: Vec<u16>,
    archive: ArchiveMode,
}

impl HttpClient {
    /// Starts building a client bound to `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url)
    }

    /// Origin URL this client was built for.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Statuses that trigger a retry.
    pub fn status_forcelist(&self) -> &[u16] {
        &self.status_forcelist
    }

    /// Archive mode of this client.
    pub fn archive_mode(&self) -> &ArchiveMode {
        &self.archive
    }

    /// Performs a GET request for `url` with `params` appended to the query.
    ///
    /// Credentials are sent as basic auth and never take part in the archive
    /// signature. A replayed error status fails the same way the live request
    /// did.
    #[instrument(skip(self, params, auth))]
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        auth: Option<&Credentials>,
    ) -> Result<RawResponse, FetchError> {
        let mut full_url =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !params.is_empty() {
            full_url.query_pairs_mut().extend_pairs(params);
        }
        let signature = RequestSignature::get(full_url.as_str());

        match &self.archive {
            ArchiveMode::Replay(archive) => {
                debug!("Replaying archived response");
                archive.replay(&signature).await?.into_result()
            }
            ArchiveMode::Record(archive) => {
                let result = self.send_with_retry(full_url, auth).await;
                if let Some(outcome) = ArchivedOutcome::from_result(&result) {
                    archive.record(&signature, &outcome).await?;
                }
                result
            }
            ArchiveMode::Disabled => self.send_with_retry(full_url, auth).await,
        }
    }

    async fn send_with_retry(
        &self,
        url: Url,
        auth: Option<&Credentials>,
    ) -> Result<RawResponse, FetchError> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(url = %url, attempt = attempts, "Making GET request");

            let mut request = self.inner.get(url.clone());
            if let Some(credentials) = auth {
                request = request.basic_auth(credentials.user(), Some(credentials.token()));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let final_url = response.url().to_string();
                        let body = response.text().await?;
                        return Ok(RawResponse {
                            status: status.as_u16(),
                            url: final_url,
                            body,
                        });
                    }

                    if !self.is_forced_retry(status) {
                        return Err(FetchError::Http {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    if !self.retry.allows_retry(attempts) {
                        return Err(FetchError::RetryExhausted {
                            url: url.to_string(),
                            status: Some(status.as_u16()),
                            attempts,
                        });
                    }

                    let delay = self
                        .retry
                        .delay_with_hint(attempts, response.retry_after_secs());
                    warn!(
                        status = status.as_u16(),
                        attempt = attempts,
                        delay_secs = delay.as_secs_f64(),
                        "Retryable status, waiting before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if self.retry.should_retry(&e) => {
                    if !self.retry.allows_retry(attempts) {
                        warn!(error = %e, attempts, "Request failed, retries exhausted");
                        return Err(FetchError::RetryExhausted {
                            url: url.to_string(),
                            status: None,
                            attempts,
                        });
                    }

                    let delay = self.retry.delay_for_attempt(attempts);
                    warn!(
                        error = %e,
                        delay_secs = delay.as_secs_f64(),
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn is_forced_retry(&self, status: StatusCode) -> bool {
        self.status_forcelist.contains(&status.as_u16())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    extra_status_forcelist: Vec<u16>,
    archive: ArchiveMode,
}

impl HttpClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            extra_status_forcelist: Vec::new(),
            archive: ArchiveMode::Disabled,
        }
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Adds source-specific statuses to the default retry set.
    pub fn extra_status_forcelist(mut self, statuses: &[u16]) -> Self {
        self.extra_status_forcelist.extend_from_slice(statuses);
        self
    }

    /// Sets the archive mode.
    pub fn archive(mut self, archive: ArchiveMode) -> Self {
        self.archive = archive;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let inner = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let mut status_forcelist = DEFAULT_STATUS_FORCELIST.to_vec();
        for status in self.extra_status_forcelist {
            if !status_forcelist.contains(&status) {
                status_forcelist.push(status);
            }
        }

        Ok(HttpClient {
            inner,
            base_url: self.base_url,
            retry: self.retry,
            status_forcelist,
            archive: self.archive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_forcelist() {
        let client = HttpClient::builder("https://example.org")
            .extra_status_forcelist(&[429, 504])
            .build()
            .unwrap();

        assert_eq!(client.status_forcelist(), &[408, 423, 504, 429]);
        assert_eq!(client.base_url(), "https://example.org");
        assert!(!client.archive_mode().is_replay());
    }

    #[test]
    fn test_raw_response_json() {
        let response = RawResponse {
            status: 200,
            url: "https://example.org".into(),
            body: r#"{"jobs":[{"name":"a"}]}"#.into(),
        };
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["jobs"][0]["name"], "a");
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("gleaner/"));
    }
}
