//! Fetch orchestration.
//!
//! The [`Connector`] owns one backend plus the per-instance run state. Each
//! call to [`Connector::fetch`] validates the category, resets the run
//! summary and returns a lazy stream of stamped [`Item`]s. Nothing is
//! fetched until the caller polls the stream, and dropping it early is
//! always safe.

use std::sync::Arc;

use chrono::Utc;
use futures::future;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use gleaner_core::{unix_timestamp, uuid, Category, FetchSummary, Item, SearchFields};
use serde_json::Value;
use tracing::{info, warn};

use crate::archive::{Archive, ArchiveMode};
use crate::backend::{Backend, Harvest};
use crate::error::{ArchiveError, FetchError};

/// Lazy sequence of stamped items.
pub type ItemStream<'a> = BoxStream<'a, Result<Item, FetchError>>;

// ============================================================================
// Connector
// ============================================================================

/// Runs fetches for one backend instance.
pub struct Connector {
    backend: Box<dyn Backend>,
    archive: Option<Arc<dyn Archive>>,
    tag: Option<String>,
    summary: FetchSummary,
}

impl Connector {
    /// Creates a connector for a backend.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            archive: None,
            tag: None,
            summary: FetchSummary::default(),
        }
    }

    /// Attaches an archive used for recording and replay.
    pub fn with_archive(mut self, archive: Arc<dyn Archive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Sets the tag stamped on items. Defaults to the origin.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Tag stamped on items.
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or_else(|| self.backend.origin())
    }

    /// Counters of the current or last run.
    pub fn summary(&self) -> &FetchSummary {
        &self.summary
    }

    /// Fetches items of `category` from the live source.
    ///
    /// When an archive is attached and the backend supports archiving every
    /// response is recorded.
    pub fn fetch(&mut self, category: Category) -> Result<ItemStream<'_>, FetchError> {
        let mode = match &self.archive {
            Some(archive) if self.backend.has_archiving() => ArchiveMode::Record(archive.clone()),
            _ => ArchiveMode::Disabled,
        };
        self.run(category, mode)
    }

    /// Replays a previously recorded run from the attached archive.
    pub fn fetch_from_archive(&mut self, category: Category) -> Result<ItemStream<'_>, FetchError> {
        if !self.backend.has_archiving() {
            return Err(FetchError::ArchivingNotSupported(
                self.backend.name().to_string(),
            ));
        }
        let archive = self.archive.clone().ok_or(ArchiveError::NotProvided)?;
        self.run(category, ArchiveMode::Replay(archive))
    }

    fn run(&mut self, category: Category, mode: ArchiveMode) -> Result<ItemStream<'_>, FetchError> {
        if !self.backend.supports_category(category) {
            return Err(FetchError::UnsupportedCategory {
                backend: self.backend.name().to_string(),
                category,
            });
        }

        self.summary.reset();
        let tag = self.tag().to_string();
        let backend: &dyn Backend = self.backend.as_ref();
        let summary = &mut self.summary;

        info!(
            backend = backend.name(),
            origin = backend.origin(),
            category = %category,
            mode = ?mode,
            "Fetching items"
        );

        let stream = backend
            .fetch_items(category, mode)
            .try_filter_map(move |harvest| {
                let result = match harvest {
                    Harvest::Skipped { branch, reason } => {
                        warn!(branch = %branch, reason = %reason, "Branch skipped");
                        summary.record_skip();
                        Ok(None)
                    }
                    Harvest::Item(data) => stamp(backend, &tag, data).map(|item| {
                        summary.record_item(&item);
                        Some(item)
                    }),
                };
                future::ready(result)
            });

        Ok(stream.boxed())
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("backend", &self.backend.name())
            .field("origin", &self.backend.origin())
            .field("archive", &self.archive.is_some())
            .field("tag", &self.tag)
            .field("summary", &self.summary)
            .finish()
    }
}

/// Wraps a raw record in the item envelope.
fn stamp(backend: &dyn Backend, tag: &str, data: Value) -> Result<Item, FetchError> {
    let origin = backend.origin();
    let item_id = backend.identifier(&data)?;
    let uuid = uuid(&[origin, item_id.as_str()])?;

    let mut search_fields = SearchFields::new();
    search_fields.insert("item_id".to_string(), Value::String(item_id));
    search_fields.extend(backend.search_fields(&data));

    Ok(Item {
        backend_name: backend.name().to_string(),
        backend_version: backend.version().to_string(),
        timestamp: unix_timestamp(Utc::now()),
        origin: origin.to_string(),
        uuid,
        updated_on: backend.updated_at(&data)?,
        category: backend.category_of(&data),
        tag: tag.to_string(),
        search_fields,
        data,
    })
}
