//! Jenkins API client.

use gleaner_core::Credentials;
use gleaner_fetch::{ArchiveMode, FetchError, HttpClient, RetryPolicy};
use tracing::{debug, instrument, warn};
use url::Url;

use super::EXTRA_STATUS_FORCELIST;

/// Retrieves job and build listings from a Jenkins server.
///
/// Each method is a single request; walking jobs is left to the backend.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: HttpClient,
    base_url: Url,
    auth: Option<Credentials>,
    blacklist_jobs: Vec<String>,
    detail_depth: u32,
}

impl JenkinsClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(
        base_url: Url,
        auth: Option<Credentials>,
        blacklist_jobs: Vec<String>,
        detail_depth: u32,
        retry: RetryPolicy,
        archive: ArchiveMode,
    ) -> Result<Self, FetchError> {
        let http = HttpClient::builder(base_url.as_str())
            .retry_policy(retry)
            .extra_status_forcelist(EXTRA_STATUS_FORCELIST)
            .archive(archive)
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth,
            blacklist_jobs,
            detail_depth,
        })
    }

    /// Whether `job_name` is excluded from fetching.
    pub fn is_blacklisted(&self, job_name: &str) -> bool {
        self.blacklist_jobs.iter().any(|job| job == job_name)
    }

    /// Returns the raw job listing.
    #[instrument(skip(self))]
    pub async fn get_jobs(&self) -> Result<String, FetchError> {
        let url = self.endpoint(&["api", "json"])?;
        let response = self.http.fetch(&url, &[], self.auth.as_ref()).await?;
        Ok(response.body)
    }

    /// Returns the raw build listing of a job.
    ///
    /// Blacklisted jobs return `None` without a request.
    #[instrument(skip(self))]
    pub async fn get_builds(&self, job_name: &str) -> Result<Option<String>, FetchError> {
        if self.is_blacklisted(job_name) {
            warn!(job = %job_name, "Not getting blacklisted job");
            return Ok(None);
        }

        let url = self.endpoint(&["job", job_name, "api", "json"])?;
        debug!(url = %url, depth = self.detail_depth, "Fetching builds");

        let params = [("depth", self.detail_depth.to_string())];
        let response = self.http.fetch(&url, &params, self.auth.as_ref()).await?;
        Ok(Some(response.body))
    }

    /// Appends path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<String, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(base: &str, blacklist: &[&str]) -> JenkinsClient {
        JenkinsClient::new(
            Url::parse(base).unwrap(),
            None,
            blacklist.iter().map(|s| (*s).to_string()).collect(),
            1,
            RetryPolicy::no_retry(),
            ArchiveMode::Disabled,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = make_client("https://build.example.org/ci/", &[]);
        assert_eq!(
            client.endpoint(&["job", "daily build", "api", "json"]).unwrap(),
            "https://build.example.org/ci/job/daily%20build/api/json"
        );

        let client = make_client("https://build.example.org/ci", &[]);
        assert_eq!(
            client.endpoint(&["api", "json"]).unwrap(),
            "https://build.example.org/ci/api/json"
        );
    }

    #[tokio::test]
    async fn test_blacklisted_job_skips_request() {
        // Nothing listens on port 9, so any request would fail the test.
        let client = make_client("http://127.0.0.1:9", &["nightly"]);
        assert!(client.is_blacklisted("nightly"));
        assert_eq!(client.get_builds("nightly").await.unwrap(), None);
    }
}
