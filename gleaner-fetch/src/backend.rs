//! Backend trait and harvest stream types.
//!
//! A backend knows how to talk to one kind of source: it builds a fresh
//! source client per run, walks whatever structure the source exposes and
//! yields raw records. It also provides the identity functions used to
//! stamp those records; the [`Connector`](crate::Connector) does the
//! stamping and the bookkeeping.

use futures::stream::BoxStream;
use gleaner_core::{Category, SearchFields};
use serde_json::Value;

use crate::archive::ArchiveMode;
use crate::error::FetchError;

// ============================================================================
// Harvest
// ============================================================================

/// One step of a backend walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Harvest {
    /// A raw record ready to be stamped.
    Item(Value),
    /// A branch that produced nothing and was skipped.
    Skipped {
        /// Name of the skipped branch (job name, collection id).
        branch: String,
        /// Why it was skipped.
        reason: String,
    },
}

impl Harvest {
    /// Shorthand for [`Harvest::Skipped`].
    pub fn skipped(branch: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skipped {
            branch: branch.into(),
            reason: reason.into(),
        }
    }
}

/// Lazy sequence of harvest steps. Ends after the first error.
pub type HarvestStream<'a> = BoxStream<'a, Result<Harvest, FetchError>>;

// ============================================================================
// Backend Trait
// ============================================================================

/// A data source behind the common fetch contract.
///
/// The identity functions (`identifier`, `updated_at`, `category_of`) are
/// pure: they only read fields of a record the backend already produced
/// and never touch the network.
pub trait Backend: Send + Sync {
    /// Backend name, e.g. `"Jenkins"`.
    fn name(&self) -> &str;

    /// Backend version string.
    fn version(&self) -> &str;

    /// Origin this backend instance is bound to.
    fn origin(&self) -> &str;

    /// Categories this backend can produce.
    fn categories(&self) -> &[Category];

    /// Whether the backend produces `category`.
    fn supports_category(&self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Whether runs can be recorded to and replayed from an archive.
    fn has_archiving(&self) -> bool;

    /// Whether an interrupted run can be resumed from a checkpoint.
    fn has_resuming(&self) -> bool;

    /// Stable identifier of a raw record.
    fn identifier(&self, item: &Value) -> Result<String, FetchError>;

    /// Update time of a raw record, in UNIX seconds.
    fn updated_at(&self, item: &Value) -> Result<f64, FetchError>;

    /// Category of a raw record.
    fn category_of(&self, item: &Value) -> Category;

    /// Backend-specific searchable fields of a raw record.
    fn search_fields(&self, _item: &Value) -> SearchFields {
        SearchFields::new()
    }

    /// Walks the source for `category`.
    ///
    /// A new source client is built for each call using `archive`, so the
    /// live/replay decision is made per run.
    fn fetch_items(&self, category: Category, archive: ArchiveMode) -> HarvestStream<'_>;
}
