//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the GraphQL endpoint and test
//! pagination, retry classification, and the full orchestration cycle end
//! to end.

use star_harvest::config::{ApiConfig, Config, CrawlConfig, OutputConfig};
use star_harvest::crawler::{Orchestrator, Paginator};
use star_harvest::github::{ApiError, GitHubClient, RateLimitGovernor, SearchVariables};
use star_harvest::storage::{SqliteStorage, Storage};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API configuration pointed at a mock server, tuned so tests never sleep
fn test_api_config(endpoint: &str) -> ApiConfig {
    ApiConfig {
        endpoint: endpoint.to_string(),
        max_retries: 3,
        backoff_base_secs: 0,
        rate_limit_threshold: 10,
        safety_margin_secs: 0,
    }
}

fn test_client(endpoint: &str) -> GitHubClient {
    GitHubClient::new(&test_api_config(endpoint), "test-token").unwrap()
}

fn test_governor() -> RateLimitGovernor {
    RateLimitGovernor::new(10, Duration::ZERO)
}

fn repo_nodes(ids: std::ops::RangeInclusive<i64>) -> Vec<serde_json::Value> {
    ids.map(|id| {
        serde_json::json!({
            "databaseId": id,
            "name": format!("repo-{}", id),
            "owner": { "login": format!("owner-{}", id % 7) },
            "stargazerCount": 10 * id
        })
    })
    .collect()
}

fn search_page(
    nodes: Vec<serde_json::Value>,
    has_next: bool,
    end_cursor: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "search": {
                "pageInfo": { "hasNextPage": has_next, "endCursor": end_cursor },
                "nodes": nodes
            },
            "rateLimit": { "remaining": 4500, "resetAt": "2030-01-01T00:00:00Z" }
        }
    })
}

fn variables<'a>(cursor: Option<&'a str>, page_size: u32) -> SearchVariables<'a> {
    SearchVariables {
        search: "stars:>1",
        cursor,
        page_size,
    }
}

#[tokio::test]
async fn test_pagination_covers_target_in_minimum_requests() {
    let mock_server = MockServer::start().await;

    // 250 records at page size 100 must take exactly 3 requests: 100+100+50
    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":null"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=100),
                true,
                Some("c1"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":"c1""#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(101..=200),
                true,
                Some("c2"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // The final request is clamped to the 50 still needed
    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":"c2""#))
        .and(body_string_contains(r#""pageSize":50"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(201..=250),
                true,
                Some("c3"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let governor = test_governor();
    let paginator = Paginator::new(&client, &governor, "stars:>1");

    let repos = paginator.fetch(250, 100).await;

    assert_eq!(repos.len(), 250);
    assert_eq!(repos[0].id, 1);
    assert_eq!(repos[249].id, 250);
}

#[tokio::test]
async fn test_page_failure_returns_accumulated_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":null"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=100),
                true,
                Some("c1"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // The second page fails persistently; three attempts then give up
    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":"c1""#))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let governor = test_governor();
    let paginator = Paginator::new(&client, &governor, "stars:>1");

    let repos = paginator.fetch(300, 100).await;

    // Page 1 survives; the failure truncates, it does not zero out
    assert_eq!(repos.len(), 100);
    assert_eq!(repos[99].id, 100);
}

#[tokio::test]
async fn test_non_recoverable_rejection_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let result = client.execute(&variables(None, 100)).await;

    match result {
        Err(ApiError::NonRecoverable { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected NonRecoverable, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_graphql_errors_are_non_recoverable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [ { "message": "Field 'databaseid' doesn't exist" } ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let result = client.execute(&variables(None, 100)).await;

    match result {
        Err(ApiError::NonRecoverable { message, .. }) => {
            assert!(message.contains("databaseid"));
        }
        other => panic!("expected NonRecoverable, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_transient_failures_exhaust_bounded_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let result = client.execute(&variables(None, 100)).await;

    assert!(matches!(result, Err(ApiError::Transient { .. })));
}

#[tokio::test]
async fn test_rate_limit_rejection_waits_without_spending_retry_budget() {
    let mock_server = MockServer::start().await;

    // First attempt is rejected with an already-passed reset instant
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-reset", "1")
                .set_body_string("API rate limit exceeded"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=10),
                false,
                None,
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // With a budget of one attempt, success proves the rate-limit wait
    // path did not count against it
    let config = ApiConfig {
        max_retries: 1,
        ..test_api_config(&mock_server.uri())
    };
    let client = GitHubClient::new(&config, "test-token").unwrap();

    let page = client.execute(&variables(None, 10)).await.unwrap();
    assert_eq!(page.nodes.len(), 10);
}

#[tokio::test]
async fn test_orchestrator_terminates_on_exhausted_remote() {
    let mock_server = MockServer::start().await;

    // The remote only ever has 150 repositories
    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":null"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=100),
                true,
                Some("c1"),
            )),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":"c1""#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(101..=150),
                false,
                None,
            )),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvest.db");

    let config = Config {
        crawl: CrawlConfig {
            total_target: 1000,
            batch_size: 1000,
            page_size: 100,
            search_query: "stars:>1".to_string(),
        },
        api: test_api_config(&mock_server.uri()),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    };

    let mut orchestrator = Orchestrator::new(config, "test-token", "test-hash").unwrap();
    let total_saved = orchestrator.run().await.unwrap();

    // Not an error and not an infinite loop: the short fetch ends the crawl
    assert_eq!(total_saved, 150);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_repositories().unwrap(), 150);
    assert_eq!(storage.count_metric_rows().unwrap(), 150);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.total_saved, 150);
    assert_eq!(run.target, 1000);
}

#[tokio::test]
async fn test_orchestrator_walks_multiple_batches_to_target() {
    let mock_server = MockServer::start().await;

    // Each batch restarts pagination from a fresh cursor; distinguish the
    // two batch openers by their requested page size
    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":null"#))
        .and(body_string_contains(r#""pageSize":100"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=100),
                true,
                Some("c1"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains(r#""cursor":null"#))
        .and(body_string_contains(r#""pageSize":50"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_page(
                repo_nodes(1..=50),
                true,
                Some("c1"),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("harvest.db");

    let config = Config {
        crawl: CrawlConfig {
            total_target: 150,
            batch_size: 100,
            page_size: 100,
            search_query: "stars:>1".to_string(),
        },
        api: test_api_config(&mock_server.uri()),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    };

    let mut orchestrator = Orchestrator::new(config, "test-token", "test-hash").unwrap();
    let total_saved = orchestrator.run().await.unwrap();

    assert_eq!(total_saved, 150);

    // The second batch re-observed repositories 1-50: the entity table
    // converges by upsert while the metric table keeps both observations
    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_repositories().unwrap(), 100);
    assert_eq!(storage.count_metric_rows().unwrap(), 150);
    assert_eq!(storage.star_history(25).unwrap().len(), 2);
}
