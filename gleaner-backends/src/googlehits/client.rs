//! Google search client.

use gleaner_fetch::{ArchiveMode, FetchError, HttpClient, RetryPolicy};
use tracing::{info, instrument};

use super::EXTRA_STATUS_FORCELIST;

/// Fetches Google search result pages.
#[derive(Debug, Clone)]
pub struct GoogleHitsClient {
    http: HttpClient,
    search_url: String,
}

impl GoogleHitsClient {
    /// Creates a client for `search_url`.
    pub fn new(
        search_url: impl Into<String>,
        retry: RetryPolicy,
        archive: ArchiveMode,
    ) -> Result<Self, FetchError> {
        let search_url = search_url.into();
        let http = HttpClient::builder(search_url.clone())
            .retry_policy(retry)
            .extra_status_forcelist(EXTRA_STATUS_FORCELIST)
            .archive(archive)
            .build()?;

        Ok(Self { http, search_url })
    }

    /// Returns the raw results page for the keywords, joined by spaces.
    #[instrument(skip(self))]
    pub async fn hits(&self, keywords: &[String]) -> Result<String, FetchError> {
        let query = keywords.join(" ");
        info!(query = %query, "Fetching hits");

        let response = self
            .http
            .fetch(&self.search_url, &[("q", query)], None)
            .await?;
        Ok(response.body)
    }
}
