//! Integration tests for cursor pagination against a mock source API

use lsx_core::auth::ApiSession;
use lsx_core::config::ExportConfig;
use lsx_core::fetch::PaginatedFetcher;
use lsx_core::ExportError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> ExportConfig {
    ExportConfig::default()
        .with_api_base(server.uri())
        .with_page_delay_ms(0)
}

fn item(id: u32) -> serde_json::Value {
    json!({"itemID": id.to_string(), "description": format!("Item {id}")})
}

#[tokio::test]
async fn test_follows_next_cursor_until_absent() {
    let server = MockServer::start().await;

    let page2_url = format!("{}/acct1/Item.json?page=2", server.uri());
    let page3_url = format!("{}/acct1/Item.json?page=3", server.uri());

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"next": page2_url},
            "Item": [item(1), item(2)]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"next": page3_url},
            "Item": [item(3)]
        })))
        .mount(&server)
        .await;

    // Final page: empty "next" terminates
    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"next": ""},
            "Item": [item(4)]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let fetcher = PaginatedFetcher::new(&session, &config);
    let records = fetcher
        .fetch_all("acct1", "Item", "description", &[], &[])
        .await
        .unwrap();

    let ids: Vec<&str> = records
        .iter()
        .map(|r| r["itemID"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_single_object_page_is_normalized() {
    let server = MockServer::start().await;

    // A one-record page arrives as a bare object, not a list
    Mock::given(method("GET"))
        .and(path("/acct1/Category.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Category": {"categoryID": "7", "name": "Bikes"}
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let fetcher = PaginatedFetcher::new(&session, &config);
    let records = fetcher
        .fetch_all("acct1", "Category", "name", &[], &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["categoryID"], "7");
}

#[tokio::test]
async fn test_missing_resource_key_means_empty_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"count": "0"}
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let fetcher = PaginatedFetcher::new(&session, &config);
    let records = fetcher
        .fetch_all("acct1", "Item", "description", &[], &[])
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_mid_pagination_failure_reports_partial_count() {
    let server = MockServer::start().await;

    let page2_url = format!("{}/acct1/Item.json?page=2", server.uri());
    let items: Vec<serde_json::Value> = (1..=200).map(item).collect();

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {"next": page2_url},
            "Item": items
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let fetcher = PaginatedFetcher::new(&session, &config);
    let err = fetcher
        .fetch_all("acct1", "Item", "description", &[], &[])
        .await
        .unwrap_err();

    match err {
        ExportError::Fetch {
            resource, partial, ..
        } => {
            assert_eq!(resource, "Item");
            assert_eq!(partial, 200);
        },
        other => panic!("expected fetch error, got {other}"),
    }
}

#[tokio::test]
async fn test_first_page_sends_relations_and_extra_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("load_relations", r#"["Images","Note"]"#))
        .and(query_param("categoryID", "12"))
        .and(query_param("sort", "description"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [item(1)]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let fetcher = PaginatedFetcher::new(&session, &config);
    let records = fetcher
        .fetch_all(
            "acct1",
            "Item",
            "description",
            &["Images", "Note"],
            &[("categoryID".to_string(), "12".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}
