use anyhow::Result;
use halo_site::config::ServiceConfig;
use halo_site::{
    CommunityLoader, HostReachability, LoadError, LoadSnapshot, LoadStatus, LoaderSettings,
    RestCommunityService, TokioDelay,
};
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use std::sync::Arc;
use std::time::Duration;

const POSTS_PATH: &str = "/rest/v1/posts";
const USERS_PATH: &str = "/rest/v1/users";

fn loader_for(server: &MockServer, key: Option<&str>) -> CommunityLoader<RestCommunityService> {
    let config = ServiceConfig::new(Some(server.base_url()), key.map(str::to_string));
    let settings = LoaderSettings {
        retry_delay: Duration::from_millis(20),
        ..LoaderSettings::default()
    };

    CommunityLoader::new(
        Arc::new(RestCommunityService::new(&config)),
        Arc::new(HostReachability::for_url(config.url())),
        Arc::new(TokioDelay),
        settings,
    )
}

async fn settled(loader: &CommunityLoader<RestCommunityService>) -> LoadSnapshot {
    let mut updates = loader.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(10), updates.wait_for(LoadSnapshot::is_settled))
        .await
        .expect("loader did not settle")
        .expect("loader dropped");
    snapshot.clone()
}

fn mock_counters(server: &MockServer) {
    server.mock(|when, then| {
        when.method(HEAD).path(USERS_PATH).header("Prefer", "count=exact");
        then.status(200).header("Content-Range", "0-0/12458");
    });
    server.mock(|when, then| {
        when.method(HEAD)
            .path(POSTS_PATH)
            .query_param("select", "id")
            .header("Prefer", "count=exact");
        then.status(200).header("Content-Range", "0-0/3872");
    });
    server.mock(|when, then| {
        when.method(HEAD)
            .path(POSTS_PATH)
            .query_param("select", "created_at")
            .query_param_exists("created_at");
        then.status(200).header("Content-Range", "*/684");
    });
}

fn mock_probe_ok(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path(POSTS_PATH)
            .query_param("select", "id")
            .query_param("limit", "1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([{ "id": 1 }]));
    })
}

#[tokio::test]
async fn test_end_to_end_community_load() -> Result<()> {
    let server = MockServer::start();
    let probe_mock = mock_probe_ok(&server);
    mock_counters(&server);
    let posts_mock = server.mock(|when, then| {
        when.method(GET)
            .path(POSTS_PATH)
            .query_param("order", "created_at.desc")
            .query_param("limit", "5")
            .header("apikey", "anon-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "id": 3,
                    "content": "The stress detection feature has been eye-opening.",
                    "created_at": "2026-10-15T12:00:00+00:00",
                    "likes": 36,
                    "replies": 8,
                    "user": { "name": "Michael Rivera", "avatar_url": null }
                },
                {
                    "id": 2,
                    "content": "Has anyone figured out how to optimize battery life?",
                    "created_at": "2026-10-15T07:00:00+00:00",
                    "likes": 18,
                    "replies": 12,
                    "user": { "name": "Sarah Chen", "avatar_url": "https://example.com/sarah.jpg" }
                }
            ]));
    });

    let mut loader = loader_for(&server, Some("anon-key"));
    loader.mount();
    let snapshot = settled(&loader).await;

    probe_mock.assert();
    posts_mock.assert();
    assert_eq!(snapshot.status, LoadStatus::Ready);
    assert_eq!(snapshot.posts.len(), 2);
    assert_eq!(snapshot.posts[0].author.name, "Michael Rivera");
    assert_eq!(snapshot.counters.active_members, 12_458);
    assert_eq!(snapshot.counters.topics_created, 3_872);
    assert_eq!(snapshot.counters.posts_this_week, 684);
    assert_eq!(snapshot.retry_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_community_shows_placeholder() -> Result<()> {
    let server = MockServer::start();
    mock_probe_ok(&server);
    mock_counters(&server);
    server.mock(|when, then| {
        when.method(GET).path(POSTS_PATH).query_param("order", "created_at.desc");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });

    let mut loader = loader_for(&server, Some("anon-key"));
    loader.mount();
    let snapshot = settled(&loader).await;

    assert_eq!(snapshot.status, LoadStatus::Ready);
    assert!(snapshot.has_no_discussions());
    Ok(())
}

#[tokio::test]
async fn test_missing_key_issues_no_requests() -> Result<()> {
    let server = MockServer::start();
    let any_mock = server.mock(|when, then| {
        when.path_contains("/rest/v1");
        then.status(200);
    });

    let mut loader = loader_for(&server, None);
    loader.mount();
    let snapshot = settled(&loader).await;

    assert_eq!(snapshot.status, LoadStatus::Errored);
    assert_eq!(snapshot.last_error, Some(LoadError::NotConfigured));
    assert_eq!(any_mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_schema_is_reported_without_retry() -> Result<()> {
    let server = MockServer::start();
    let probe_mock = server.mock(|when, then| {
        when.method(GET).path(POSTS_PATH);
        then.status(404)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "code": "42P01",
                "message": "relation \"public.posts\" does not exist"
            }));
    });

    let mut loader = loader_for(&server, Some("anon-key"));
    loader.mount();
    let snapshot = settled(&loader).await;

    assert_eq!(snapshot.last_error, Some(LoadError::SchemaMissing));
    assert_eq!(
        snapshot.error_message(),
        Some(LoadError::SchemaMissing.user_message())
    );
    probe_mock.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_key_is_reported_without_retry() -> Result<()> {
    let server = MockServer::start();
    let probe_mock = server.mock(|when, then| {
        when.method(GET).path(POSTS_PATH);
        then.status(401)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "message": "Invalid API key" }));
    });

    let mut loader = loader_for(&server, Some("wrong-key"));
    loader.mount();
    let snapshot = settled(&loader).await;

    assert_eq!(snapshot.last_error, Some(LoadError::Unauthorized));
    probe_mock.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_service_exhausts_retries() -> Result<()> {
    let server = MockServer::start();
    let probe_mock = server.mock(|when, then| {
        when.method(GET).path(POSTS_PATH);
        then.status(503).body("upstream unavailable");
    });

    let mut loader = loader_for(&server, Some("anon-key"));
    loader.mount();
    let snapshot = settled(&loader).await;

    assert_eq!(snapshot.status, LoadStatus::Errored);
    assert_eq!(snapshot.last_error, Some(LoadError::RetriesExhausted { attempts: 4 }));
    assert_eq!(snapshot.retry_count, 3);

    tokio::time::sleep(Duration::from_millis(100)).await;
    probe_mock.assert_hits(4);
    Ok(())
}
