//! Fetch run summary.

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Counters accumulated during one fetch run.
///
/// Owned by the connector performing the run and reset at the start of
/// every fetch. Skipped branches are only visible here, never in the item
/// stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Items emitted.
    pub fetched: u64,
    /// Branches skipped because they were unavailable, empty or unparsable.
    pub skipped: u64,
    /// Smallest `updated_on` seen.
    pub min_updated_on: Option<f64>,
    /// Largest `updated_on` seen.
    pub max_updated_on: Option<f64>,
    /// `updated_on` of the last item emitted.
    pub last_updated_on: Option<f64>,
    /// `uuid` of the last item emitted.
    pub last_uuid: Option<String>,
}

impl FetchSummary {
    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accounts for an emitted item.
    pub fn record_item(&mut self, item: &Item) {
        self.fetched += 1;
        self.min_updated_on = Some(
            self.min_updated_on
                .map_or(item.updated_on, |min| min.min(item.updated_on)),
        );
        self.max_updated_on = Some(
            self.max_updated_on
                .map_or(item.updated_on, |max| max.max(item.updated_on)),
        );
        self.last_updated_on = Some(item.updated_on);
        self.last_uuid = Some(item.uuid.clone());
    }

    /// Accounts for a skipped branch.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Items emitted plus branches skipped.
    pub fn total(&self) -> u64 {
        self.fetched + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, SearchFields};
    use serde_json::Value;

    fn item(uuid: &str, updated_on: f64) -> Item {
        Item {
            backend_name: "Test".into(),
            backend_version: "0.1.0".into(),
            timestamp: 0.0,
            origin: "o".into(),
            uuid: uuid.into(),
            updated_on,
            category: Category::Build,
            tag: "o".into(),
            search_fields: SearchFields::new(),
            data: Value::Null,
        }
    }

    #[test]
    fn test_record_items_tracks_bounds() {
        let mut summary = FetchSummary::default();
        summary.record_item(&item("a", 20.0));
        summary.record_item(&item("b", 10.0));
        summary.record_item(&item("c", 15.0));

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.min_updated_on, Some(10.0));
        assert_eq!(summary.max_updated_on, Some(20.0));
        assert_eq!(summary.last_updated_on, Some(15.0));
        assert_eq!(summary.last_uuid.as_deref(), Some("c"));
    }

    #[test]
    fn test_reset() {
        let mut summary = FetchSummary::default();
        summary.record_item(&item("a", 1.0));
        summary.record_skip();
        assert_eq!(summary.total(), 2);

        summary.reset();
        assert_eq!(summary, FetchSummary::default());
    }
}
