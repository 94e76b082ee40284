//! The item envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::Category;

/// Extra searchable fields attached to an item (`item_id` plus backend extras).
pub type SearchFields = Map<String, Value>;

/// Converts an instant into UNIX seconds with microsecond precision.
#[allow(clippy::cast_precision_loss)]
pub fn unix_timestamp(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_micros() as f64 / 1_000_000.0
}

// ============================================================================
// Item
// ============================================================================

/// A normalized record emitted by a backend.
///
/// `data` holds the raw record exactly as the backend parsed it; every other
/// field is stamped by the connector from the backend's identity functions
/// before the item is handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Name of the backend that produced the item.
    pub backend_name: String,
    /// Version of that backend.
    pub backend_version: String,
    /// When the envelope was built (UNIX seconds).
    pub timestamp: f64,
    /// Origin the backend is bound to.
    pub origin: String,
    /// Stable identifier: `uuid(origin, item_id)`.
    pub uuid: String,
    /// Update time used for incremental sync (UNIX seconds).
    pub updated_on: f64,
    /// Category of the item.
    pub category: Category,
    /// Label used to mark the data (defaults to the origin).
    pub tag: String,
    /// Searchable fields, always including `item_id`.
    pub search_fields: SearchFields,
    /// The raw record.
    pub data: Value,
}

impl Item {
    /// Returns the backend-level identifier stored in `search_fields`.
    pub fn item_id(&self) -> Option<&str> {
        self.search_fields.get("item_id").and_then(Value::as_str)
    }
}
