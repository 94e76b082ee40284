//! Jenkins backend and its job walk.

use std::collections::VecDeque;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use gleaner_core::{Category, CoreError, Credentials, SearchFields};
use gleaner_fetch::{
    ArchiveMode, Backend, Backoff, FetchError, Harvest, HarvestStream, RetryPolicy,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::client::JenkinsClient;
use super::{DEFAULT_DETAIL_DEPTH, DEFAULT_MAX_RETRIES, DEFAULT_SLEEP_TIME, VERSION};

/// Status that marks a job as temporarily unavailable.
const UNAVAILABLE_STATUS: u16 = 500;

// ============================================================================
// Configuration
// ============================================================================

/// Construction settings for [`Jenkins`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JenkinsConfig {
    /// Server URL; also the origin.
    pub url: String,
    /// User for basic auth.
    pub user: Option<String>,
    /// API token for basic auth.
    pub api_token: Option<String>,
    /// `depth` parameter of build listings; must be at least 1.
    pub detail_depth: u32,
    /// Base delay between retries.
    pub sleep_time: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Jobs never fetched.
    pub blacklist_ids: Vec<String>,
}

impl JenkinsConfig {
    /// Settings for `url` with default values.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            api_token: None,
            detail_depth: DEFAULT_DETAIL_DEPTH,
            sleep_time: DEFAULT_SLEEP_TIME,
            max_retries: DEFAULT_MAX_RETRIES,
            blacklist_ids: Vec::new(),
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Builds of every job on a Jenkins server.
#[derive(Debug, Clone)]
pub struct Jenkins {
    origin: String,
    url: Url,
    auth: Option<Credentials>,
    detail_depth: u32,
    retry: RetryPolicy,
    blacklist_ids: Vec<String>,
}

impl Jenkins {
    /// Builds the backend.
    ///
    /// # Errors
    ///
    /// Fails when the URL is invalid, the detail depth is zero, or only one
    /// of user and API token is given.
    pub fn new(config: JenkinsConfig) -> Result<Self, FetchError> {
        let auth = Credentials::from_parts(config.user, config.api_token)?;
        let url = Url::parse(&config.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.url)))?;

        if url.cannot_be_a_base() {
            return Err(CoreError::InvalidConfig(format!("{} is not a server URL", config.url)).into());
        }

        if config.detail_depth == 0 {
            return Err(CoreError::InvalidConfig("detail depth must be at least 1".to_string()).into());
        }

        let retry = RetryPolicy::new(config.max_retries)
            .with_sleep_time(config.sleep_time)
            .with_backoff(Backoff::Fixed);

        Ok(Self {
            origin: config.url,
            url,
            auth,
            detail_depth: config.detail_depth,
            retry,
            blacklist_ids: config.blacklist_ids,
        })
    }

    /// Whether requests carry basic auth.
    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    fn client(&self, archive: ArchiveMode) -> Result<JenkinsClient, FetchError> {
        JenkinsClient::new(
            self.url.clone(),
            self.auth.clone(),
            self.blacklist_ids.clone(),
            self.detail_depth,
            self.retry.clone(),
            archive,
        )
    }
}

impl Backend for Jenkins {
    fn name(&self) -> &str {
        "Jenkins"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn categories(&self) -> &[Category] {
        &[Category::Build]
    }

    fn has_archiving(&self) -> bool {
        true
    }

    fn has_resuming(&self) -> bool {
        false
    }

    fn identifier(&self, item: &Value) -> Result<String, FetchError> {
        item["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FetchError::Parse("build without url".to_string()))
    }

    fn updated_at(&self, item: &Value) -> Result<f64, FetchError> {
        item["timestamp"]
            .as_f64()
            .map(|millis| millis / 1000.0)
            .ok_or_else(|| FetchError::Parse("build without timestamp".to_string()))
    }

    fn category_of(&self, _item: &Value) -> Category {
        Category::Build
    }

    fn search_fields(&self, item: &Value) -> SearchFields {
        let mut fields = SearchFields::new();
        fields.insert("number".to_string(), item["number"].clone());
        fields
    }

    fn fetch_items(&self, _category: Category, archive: ArchiveMode) -> HarvestStream<'_> {
        let client = match self.client(archive) {
            Ok(client) => client,
            Err(e) => return stream::once(async move { Err::<Harvest, _>(e) }).boxed(),
        };

        info!(url = %self.origin, "Looking for projects");
        stream::try_unfold(JobWalk::new(client), JobWalk::next).boxed()
    }
}

// ============================================================================
// Job Walk
// ============================================================================

/// What one job contributed.
enum JobOutcome {
    Builds(Vec<Value>),
    Skipped(String),
}

/// State of a walk over jobs and their builds.
struct JobWalk {
    client: JenkinsClient,
    jobs: Option<VecDeque<Value>>,
    pending: VecDeque<Value>,
    total_jobs: usize,
    njobs: usize,
    nbuilds: usize,
}

impl JobWalk {
    fn new(client: JenkinsClient) -> Self {
        Self {
            client,
            jobs: None,
            pending: VecDeque::new(),
            total_jobs: 0,
            njobs: 0,
            nbuilds: 0,
        }
    }

    /// Advances to the next build or skipped job.
    async fn next(mut self) -> Result<Option<(Harvest, Self)>, FetchError> {
        loop {
            if let Some(build) = self.pending.pop_front() {
                self.nbuilds += 1;
                return Ok(Some((Harvest::Item(build), self)));
            }

            if self.jobs.is_none() {
                let jobs = self.list_jobs().await?;
                self.total_jobs = jobs.len();
                self.jobs = Some(jobs);
            }

            let Some(job) = self.jobs.as_mut().and_then(VecDeque::pop_front) else {
                info!(
                    jobs = self.njobs,
                    total = self.total_jobs,
                    builds = self.nbuilds,
                    "Fetch process completed"
                );
                return Ok(None);
            };

            let name = job["name"]
                .as_str()
                .ok_or_else(|| FetchError::Parse("job without name".to_string()))?
                .to_string();
            debug!(
                job = %name,
                position = self.njobs,
                total = self.total_jobs,
                "Adding builds"
            );

            let outcome = self.job_builds(&name).await?;
            match outcome {
                JobOutcome::Builds(builds) => {
                    self.njobs += 1;
                    self.pending.extend(builds);
                }
                JobOutcome::Skipped(reason) => {
                    return Ok(Some((Harvest::skipped(name, reason), self)));
                }
            }
        }
    }

    async fn list_jobs(&self) -> Result<VecDeque<Value>, FetchError> {
        let raw = self.client.get_jobs().await?;
        let mut projects: Value = serde_json::from_str(&raw)?;

        match projects.get_mut("jobs").map(Value::take) {
            Some(Value::Array(jobs)) => Ok(jobs.into()),
            _ => Err(FetchError::Parse("job listing without 'jobs'".to_string())),
        }
    }

    /// Fetches the builds of one job, turning recoverable failures into skips.
    async fn job_builds(&self, name: &str) -> Result<JobOutcome, FetchError> {
        let raw = match self.client.get_builds(name).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(JobOutcome::Skipped("blacklisted".to_string())),
            Err(e) if e.status() == Some(UNAVAILABLE_STATUS) => {
                warn!(job = %name, error = %e, "Unable to fetch builds; skipping");
                return Ok(JobOutcome::Skipped(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        if raw.trim().is_empty() {
            return Ok(JobOutcome::Skipped("empty build listing".to_string()));
        }

        let mut listing: Value = match serde_json::from_str(&raw) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(job = %name, error = %e, "Unable to parse builds; skipping");
                return Ok(JobOutcome::Skipped(format!("unparsable build listing: {e}")));
            }
        };

        match listing.get_mut("builds").map(Value::take) {
            Some(Value::Array(builds)) => Ok(JobOutcome::Builds(builds)),
            _ => Ok(JobOutcome::Skipped("build listing without 'builds'".to_string())),
        }
    }
}
