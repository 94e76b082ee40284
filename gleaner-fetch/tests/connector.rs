//! Connector orchestration with an in-process backend.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use gleaner_core::{Category, SearchFields};
use gleaner_fetch::{
    ArchiveError, ArchiveMode, Backend, Connector, FetchError, Harvest, HarvestStream,
    MemoryArchive,
};
use serde_json::{json, Value};

const ORIGIN: &str = "https://ci.example.org";

/// Replays a fixed script of harvest steps.
struct ScriptedBackend {
    script: Vec<Result<Harvest, String>>,
    archiving: bool,
}

impl ScriptedBackend {
    fn new(script: Vec<Result<Harvest, String>>) -> Self {
        Self {
            script,
            archiving: true,
        }
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn origin(&self) -> &str {
        ORIGIN
    }

    fn categories(&self) -> &[Category] {
        &[Category::Build]
    }

    fn has_archiving(&self) -> bool {
        self.archiving
    }

    fn has_resuming(&self) -> bool {
        false
    }

    fn identifier(&self, item: &Value) -> Result<String, FetchError> {
        item["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FetchError::Parse("missing url".into()))
    }

    fn updated_at(&self, item: &Value) -> Result<f64, FetchError> {
        item["timestamp"]
            .as_f64()
            .map(|ms| ms / 1000.0)
            .ok_or_else(|| FetchError::Parse("missing timestamp".into()))
    }

    fn category_of(&self, _item: &Value) -> Category {
        Category::Build
    }

    fn search_fields(&self, item: &Value) -> SearchFields {
        let mut fields = SearchFields::new();
        fields.insert("number".into(), item["number"].clone());
        fields
    }

    fn fetch_items(&self, _category: Category, _archive: ArchiveMode) -> HarvestStream<'_> {
        let steps = self
            .script
            .iter()
            .cloned()
            .map(|step| step.map_err(FetchError::Parse));
        stream::iter(steps).boxed()
    }
}

fn build(number: u64) -> Harvest {
    Harvest::Item(json!({
        "url": format!("{ORIGIN}/job/a/{number}/"),
        "number": number,
        "timestamp": 1_500_000_000_000u64 + number * 1000,
    }))
}

#[tokio::test]
async fn test_items_are_stamped() {
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(vec![Ok(build(1))])));

    let items: Vec<_> = connector
        .fetch(Category::Build)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.backend_name, "Scripted");
    assert_eq!(item.backend_version, "1.0.0");
    assert_eq!(item.origin, ORIGIN);
    assert_eq!(item.tag, ORIGIN);
    assert_eq!(item.category, Category::Build);
    assert_eq!(item.item_id(), Some("https://ci.example.org/job/a/1/"));
    assert_eq!(item.search_fields["number"], json!(1));
    assert!((item.updated_on - 1_500_000_001.0).abs() < f64::EPSILON);
    assert_eq!(
        item.uuid,
        gleaner_core::uuid(&[ORIGIN, "https://ci.example.org/job/a/1/"]).unwrap()
    );
}

#[tokio::test]
async fn test_skipped_branches_counted_not_emitted() {
    let script = vec![
        Ok(build(1)),
        Ok(build(2)),
        Ok(Harvest::skipped("b", "HTTP 500")),
        Ok(Harvest::skipped("c", "empty payload")),
    ];
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(script))).with_tag("ci");

    let items: Vec<_> = connector
        .fetch(Category::Build)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.tag == "ci"));

    let summary = connector.summary();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.max_updated_on, Some(1_500_000_002.0));
}

#[tokio::test]
async fn test_fatal_error_aborts_run() {
    let script = vec![Ok(build(1)), Err("boom".to_string()), Ok(build(2))];
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(script)));

    let mut stream = connector.fetch(Category::Build).unwrap();
    assert!(stream.next().await.unwrap().is_ok());
    assert!(matches!(
        stream.next().await.unwrap(),
        Err(FetchError::Parse(_))
    ));
}

#[tokio::test]
async fn test_summary_reset_between_runs() {
    let script = vec![Ok(build(1)), Ok(Harvest::skipped("b", "HTTP 500"))];
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(script)));

    for _ in 0..2 {
        let count = connector
            .fetch(Category::Build)
            .unwrap()
            .try_collect::<Vec<_>>()
            .await
            .unwrap()
            .len();
        assert_eq!(count, 1);
        assert_eq!(connector.summary().fetched, 1);
        assert_eq!(connector.summary().skipped, 1);
    }
}

#[tokio::test]
async fn test_abandoned_stream_is_safe() {
    let script = vec![Ok(build(1)), Ok(build(2)), Ok(build(3))];
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(script)));

    {
        let mut stream = connector.fetch(Category::Build).unwrap();
        assert!(stream.next().await.is_some());
    }
    assert_eq!(connector.summary().fetched, 1);
}

#[test]
fn test_unsupported_category() {
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(Vec::new())));

    let err = connector.fetch(Category::Hits).err().unwrap();
    assert!(matches!(
        err,
        FetchError::UnsupportedCategory {
            category: Category::Hits,
            ..
        }
    ));
    assert!(err.is_config());
}

#[test]
fn test_fetch_from_archive_requires_archive() {
    let mut connector = Connector::new(Box::new(ScriptedBackend::new(Vec::new())));

    let err = connector.fetch_from_archive(Category::Build).err().unwrap();
    assert!(matches!(err, FetchError::Archive(ArchiveError::NotProvided)));
}

#[test]
fn test_fetch_from_archive_requires_archiving_backend() {
    let mut backend = ScriptedBackend::new(Vec::new());
    backend.archiving = false;
    let mut connector =
        Connector::new(Box::new(backend)).with_archive(Arc::new(MemoryArchive::new()));

    let err = connector.fetch_from_archive(Category::Build).err().unwrap();
    assert!(matches!(err, FetchError::ArchivingNotSupported(ref name) if name == "Scripted"));
}
