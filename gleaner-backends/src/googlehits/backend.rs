//! Google hits backend.

use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use gleaner_core::{unix_timestamp, uuid, Category, CoreError, SearchFields};
use gleaner_fetch::{ArchiveMode, Backend, FetchError, Harvest, HarvestStream, RetryPolicy};
use serde_json::{json, Value};
use tracing::info;

use super::client::GoogleHitsClient;
use super::parser::parse_hits;
use super::{DEFAULT_MAX_RETRIES, DEFAULT_SLEEP_TIME, GOOGLE_SEARCH_URL, VERSION};

/// Item type marker stored in every record.
const ITEM_TYPE: &str = "googleSearchHits";

/// Construction settings for [`GoogleHits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleHitsConfig {
    /// Keywords searched together.
    pub keywords: Vec<String>,
    /// Search endpoint; also the origin.
    pub search_url: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries.
    pub sleep_time: Duration,
}

impl GoogleHitsConfig {
    /// Settings with default transport values.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            search_url: GOOGLE_SEARCH_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            sleep_time: DEFAULT_SLEEP_TIME,
        }
    }
}

/// Number of Google results for a keyword list.
#[derive(Debug, Clone)]
pub struct GoogleHits {
    keywords: Vec<String>,
    search_url: String,
    retry: RetryPolicy,
}

impl GoogleHits {
    /// Builds the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when no non-blank keyword is given.
    pub fn new(config: GoogleHitsConfig) -> Result<Self, CoreError> {
        let keywords: Vec<String> = config
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if keywords.is_empty() {
            return Err(CoreError::InvalidConfig(
                "At least one keyword is required".to_string(),
            ));
        }

        Ok(Self {
            keywords,
            search_url: config.search_url,
            retry: RetryPolicy::new(config.max_retries).with_sleep_time(config.sleep_time),
        })
    }

    /// Keywords searched.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    async fn harvest(&self, archive: ArchiveMode) -> Result<Harvest, FetchError> {
        info!(keywords = ?self.keywords, "Fetching data");

        let client = GoogleHitsClient::new(&self.search_url, self.retry.clone(), archive)?;
        let page = client.hits(&self.keywords).await?;
        let record = self.build_record(parse_hits(&page)?)?;

        info!("Fetch process completed");
        Ok(Harvest::Item(record))
    }

    /// Builds the raw record; the id depends on the fetch instant.
    fn build_record(&self, hits: u64) -> Result<Value, CoreError> {
        let fetched_on = unix_timestamp(Utc::now());

        let mut id_parts = self.keywords.clone();
        id_parts.push(fetched_on.to_string());

        Ok(json!({
            "fetched_on": fetched_on,
            "id": uuid(&id_parts)?,
            "keywords": self.keywords,
            "type": ITEM_TYPE,
            "hits": hits,
        }))
    }
}

impl Backend for GoogleHits {
    fn name(&self) -> &str {
        "GoogleHits"
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn origin(&self) -> &str {
        &self.search_url
    }

    fn categories(&self) -> &[Category] {
        &[Category::Hits]
    }

    fn has_archiving(&self) -> bool {
        true
    }

    fn has_resuming(&self) -> bool {
        true
    }

    fn identifier(&self, item: &Value) -> Result<String, FetchError> {
        item["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FetchError::Parse("hits record without id".to_string()))
    }

    fn updated_at(&self, item: &Value) -> Result<f64, FetchError> {
        item["fetched_on"]
            .as_f64()
            .ok_or_else(|| FetchError::Parse("hits record without fetched_on".to_string()))
    }

    fn category_of(&self, _item: &Value) -> Category {
        Category::Hits
    }

    fn search_fields(&self, item: &Value) -> SearchFields {
        let mut fields = SearchFields::new();
        fields.insert("keywords".to_string(), item["keywords"].clone());
        fields
    }

    fn fetch_items(&self, _category: Category, archive: ArchiveMode) -> HarvestStream<'_> {
        stream::once(self.harvest(archive)).boxed()
    }
}
