//! Jenkins backend against a mock server.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{StreamExt, TryStreamExt};
use gleaner_backends::{Jenkins, JenkinsConfig};
use gleaner_core::{Category, Item};
use gleaner_fetch::{Connector, FetchError, MemoryArchive};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> JenkinsConfig {
    let mut config = JenkinsConfig::new(server.uri());
    config.sleep_time = Duration::from_millis(10);
    config.max_retries = 1;
    config
}

fn connector(config: JenkinsConfig) -> Connector {
    Connector::new(Box::new(Jenkins::new(config).unwrap()))
}

fn jobs(server: &MockServer, names: &[&str]) -> Value {
    let jobs: Vec<Value> = names
        .iter()
        .map(|name| json!({ "name": name, "url": format!("{}/job/{name}/", server.uri()) }))
        .collect();
    json!({ "jobs": jobs })
}

fn builds(server: &MockServer, job: &str, numbers: &[u64]) -> Value {
    let builds: Vec<Value> = numbers
        .iter()
        .map(|n| {
            json!({
                "url": format!("{}/job/{job}/{n}/", server.uri()),
                "number": n,
                "timestamp": 1_500_000_000_000u64 + n * 1000,
                "result": "SUCCESS",
            })
        })
        .collect();
    json!({ "builds": builds })
}

async fn mount_jobs(server: &MockServer, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(server, names)))
        .mount(server)
        .await;
}

async fn mount_builds(server: &MockServer, job: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/job/{job}/api/json")))
        .and(query_param("depth", "1"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn collect(connector: &mut Connector) -> Result<Vec<Item>, FetchError> {
    connector.fetch(Category::Build)?.try_collect().await
}

#[tokio::test]
async fn test_unavailable_job_is_skipped() {
    let server = MockServer::start().await;
    mount_jobs(&server, &["A", "B"]).await;
    mount_builds(
        &server,
        "A",
        ResponseTemplate::new(200).set_body_json(builds(&server, "A", &[1, 2])),
    )
    .await;
    mount_builds(&server, "B", ResponseTemplate::new(500)).await;

    let mut connector = connector(config(&server));
    let items = collect(&mut connector).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].item_id(),
        Some(format!("{}/job/A/1/", server.uri()).as_str())
    );
    assert_eq!(items[1].search_fields["number"], json!(2));
    assert!(items.iter().all(|i| i.category == Category::Build));
    assert!((items[0].updated_on - 1_500_000_001.0).abs() < 1e-6);

    assert_eq!(connector.summary().fetched, 2);
    assert_eq!(connector.summary().skipped, 1);
}

#[tokio::test]
async fn test_empty_and_unparsable_jobs_are_skipped() {
    let server = MockServer::start().await;
    mount_jobs(&server, &["A", "empty", "garbage", "D"]).await;
    mount_builds(
        &server,
        "A",
        ResponseTemplate::new(200).set_body_json(builds(&server, "A", &[1])),
    )
    .await;
    mount_builds(&server, "empty", ResponseTemplate::new(200)).await;
    mount_builds(
        &server,
        "garbage",
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;
    mount_builds(
        &server,
        "D",
        ResponseTemplate::new(200).set_body_json(builds(&server, "D", &[3, 4, 5])),
    )
    .await;

    let mut connector = connector(config(&server));
    let items = collect(&mut connector).await.unwrap();

    let numbers: Vec<_> = items.iter().map(|i| i.data["number"].clone()).collect();
    assert_eq!(numbers, [json!(1), json!(3), json!(4), json!(5)]);
    assert_eq!(connector.summary().skipped, 2);
}

#[tokio::test]
async fn test_blacklisted_job_never_requested() {
    let server = MockServer::start().await;
    mount_jobs(&server, &["A", "B"]).await;
    mount_builds(
        &server,
        "A",
        ResponseTemplate::new(200).set_body_json(builds(&server, "A", &[1])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/job/B/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(builds(&server, "B", &[9])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.blacklist_ids = vec!["B".to_string()];
    let mut connector = connector(config);
    let items = collect(&mut connector).await.unwrap();

    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|i| !i.data["url"].as_str().unwrap().contains("/job/B/")));
    assert_eq!(connector.summary().skipped, 1);
}

#[tokio::test]
async fn test_other_errors_abort_the_run() {
    let server = MockServer::start().await;
    mount_jobs(&server, &["A", "B"]).await;
    mount_builds(&server, "A", ResponseTemplate::new(404)).await;
    mount_builds(
        &server,
        "B",
        ResponseTemplate::new(200).set_body_json(builds(&server, "B", &[1])),
    )
    .await;

    let mut connector = connector(config(&server));
    let mut stream = connector.fetch(Category::Build).unwrap();

    let first = stream.next().await.unwrap();
    assert!(matches!(first, Err(FetchError::Http { status: 404, .. })));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_root_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut connector = connector(config(&server));
    let err = collect(&mut connector).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_basic_auth_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .and(header("authorization", "Basic dXNlcjp0b2tlbg=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.user = Some("user".to_string());
    config.api_token = Some("token".to_string());
    let mut connector = connector(config);

    assert!(collect(&mut connector).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replay_yields_identical_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(&server, &["A"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/A/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(builds(&server, "A", &[1, 2])))
        .expect(1)
        .mount(&server)
        .await;

    let archive = Arc::new(MemoryArchive::new());
    let mut connector = connector(config(&server)).with_archive(archive.clone());

    let live = collect(&mut connector).await.unwrap();
    assert_eq!(archive.len().await, 2);

    let replayed: Vec<Item> = connector
        .fetch_from_archive(Category::Build)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let ids = |items: &[Item]| -> Vec<(String, Category, Value)> {
        items
            .iter()
            .map(|i| (i.uuid.clone(), i.category, i.data.clone()))
            .collect()
    };
    assert_eq!(ids(&live), ids(&replayed));
    assert_eq!(connector.summary().fetched, 2);
}

#[tokio::test]
async fn test_replay_preserves_skipped_jobs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(&server, &["A", "B"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/A/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(builds(&server, "A", &[1, 2])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/B/api/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let archive = Arc::new(MemoryArchive::new());
    let mut connector = connector(config(&server)).with_archive(archive.clone());

    let live = collect(&mut connector).await.unwrap();
    assert_eq!(live.len(), 2);
    assert_eq!(connector.summary().skipped, 1);
    assert_eq!(archive.len().await, 3);

    let replayed: Vec<Item> = connector
        .fetch_from_archive(Category::Build)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let uuids = |items: &[Item]| -> Vec<String> { items.iter().map(|i| i.uuid.clone()).collect() };
    assert_eq!(uuids(&live), uuids(&replayed));
    assert_eq!(connector.summary().fetched, 2);
    assert_eq!(connector.summary().skipped, 1);
}
