//! Listing behavior: parsing, name validation, retry on server errors.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use updrive_core::ports::IRemoteStore;

use crate::common;

#[tokio::test]
async fn test_list_returns_entry_names() {
    let server = MockServer::start().await;
    common::mount_listing(&server, &["a.txt", "b.txt"]).await;

    let store = common::test_store(&server, 0);
    let names = store.list().await.expect("listing failed");

    let raw: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
    assert_eq!(raw, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_list_empty_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("fields", "items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    let names = store.list().await.expect("listing failed");
    assert!(names.is_empty());
}

#[tokio::test]
async fn test_list_skips_unrepresentable_names() {
    let server = MockServer::start().await;
    common::mount_listing(&server, &["ok.txt", "nested/entry"]).await;

    let store = common::test_store(&server, 0);
    let names = store.list().await.expect("listing failed");

    assert_eq!(names.len(), 1);
    assert_eq!(names[0].as_str(), "ok.txt");
}

#[tokio::test]
async fn test_list_sends_bearer_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", format!("Bearer {}", common::TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    store.list().await.expect("listing failed");
}

#[tokio::test]
async fn test_list_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    // Two 500s, then the regular listing takes over.
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("fields", "items"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    common::mount_listing(&server, &["a.txt"]).await;

    let store = common::test_store(&server, 3);
    let names = store.list().await.expect("listing should recover");
    assert_eq!(names.len(), 1);
}

#[tokio::test]
async fn test_list_surfaces_error_after_budget_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("fields", "items"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // 1 initial attempt + 2 retries
        .mount(&server)
        .await;

    let store = common::test_store(&server, 2);
    assert!(store.list().await.is_err());
}

#[tokio::test]
async fn test_list_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("fields", "items"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = common::test_store(&server, 3);
    assert!(store.list().await.is_err());
}
