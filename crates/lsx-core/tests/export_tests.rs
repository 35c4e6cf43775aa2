//! Integration tests for the full export pipeline against a mock source API

use lsx_core::auth::ApiSession;
use lsx_core::config::ExportConfig;
use lsx_core::engine::ExportEngine;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> ExportConfig {
    ExportConfig::default()
        .with_api_base(server.uri())
        .with_page_delay_ms(0)
}

async fn mount_lookup(server: &MockServer, resource: &str, key: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/acct1/{resource}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            key: body
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_export_joins_lookups_into_rows() {
    let server = MockServer::start().await;

    mount_lookup(
        &server,
        "Vendor",
        "Vendor",
        json!([{"vendorID": "3", "name": "Acme Supply"}]),
    )
    .await;
    mount_lookup(
        &server,
        "Category",
        "Category",
        json!([{"categoryID": "9", "fullPathName": "Bikes/Road", "name": "Road"}]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [{
                "itemID": "101",
                "description": "Road Bike",
                "defaultCost": "400.00",
                "defaultVendorID": "3",
                "categoryID": "9",
                "Prices": {"ItemPrice": [{"useType": "Default", "amount": "899.99"}]}
            }]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine
        .export(&["name", "cost", "price", "vendor_name", "category", "subcategory_1"], None)
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert_eq!(row["itemID"], "101");
    assert_eq!(row["name"], "Road Bike");
    assert_eq!(row["price"], "899.99");
    assert_eq!(row["vendor_name"], "Acme Supply");
    assert_eq!(row["category"], "Bikes");
    assert_eq!(row["subcategory_1"], "Road");
}

#[tokio::test]
async fn test_failed_lookup_degrades_to_empty_fields() {
    let server = MockServer::start().await;

    // Department lookup is down; export must still complete
    Mock::given(method("GET"))
        .and(path("/acct1/Department.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [{"itemID": "1", "description": "Widget", "departmentID": "4"}]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine.export(&["name", "department"], None).await.unwrap();

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0]["name"], "Widget");
    assert_eq!(outcome.rows[0]["department"], "");
}

#[tokio::test]
async fn test_rejected_relation_set_retries_minimal() {
    let server = MockServer::start().await;

    // Full relation set is rejected with a 400
    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("load_relations", r#"["ItemShops","Images"]"#))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad relation"))
        .mount(&server)
        .await;

    // Minimal retry keeps only the image relation
    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("load_relations", r#"["Images"]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [{
                "itemID": "1",
                "description": "Widget",
                "Images": {"Image": [{"url": "https://cdn.example.com/w.jpg"}]}
            }]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine
        .export(&["name", "averageCost", "image"], None)
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0]["image_urls"], "https://cdn.example.com/w.jpg");
    // Shop data never loaded, so the numeric field stays empty
    assert_eq!(outcome.rows[0]["averageCost"], "");
}

#[tokio::test]
async fn test_items_are_fetched_in_item_id_order() {
    let server = MockServer::start().await;

    // Stable itemID ordering keeps repeated exports comparable
    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("sort", "itemID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [{"itemID": "1", "description": "Widget"}]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine.export(&["name"], None).await.unwrap();
    assert_eq!(outcome.rows.len(), 1);
}

#[tokio::test]
async fn test_category_filter_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param("categoryID", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": [{"itemID": "1", "description": "Filtered"}]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine.export(&["name"], Some("12")).await.unwrap();
    assert_eq!(outcome.rows.len(), 1);
}

#[tokio::test]
async fn test_export_without_filter_sends_no_category_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(query_param_is_missing("categoryID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": []
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let outcome = engine.export(&["name"], None).await.unwrap();
    assert!(outcome.rows.is_empty());
}

#[tokio::test]
async fn test_categories_listing_sorted_by_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Category.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Category": [
                {"categoryID": "2", "fullPathName": "Parts/Wheels", "name": "Wheels"},
                {"categoryID": "1", "fullPathName": "Bikes", "name": "Bikes"},
                {"categoryID": "", "name": "orphan"}
            ]
        })))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let config = test_config(&server);
    let engine = ExportEngine::new(&session, &config, "acct1");
    let categories = engine.categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].id, "1");
    assert_eq!(categories[0].path, "Bikes");
    assert_eq!(categories[1].path, "Parts/Wheels");
}
