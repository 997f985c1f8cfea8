//! Shared test helpers for disk API integration tests
//!
//! Provides a wiremock-backed store with a zero-delay retry policy so that
//! retry paths run instantly.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use updrive_api::{DiskClient, DiskRemoteStore, RetryPolicy};

/// Remote folder used by every test
pub const REMOTE_DIR: &str = "backup";

/// Bearer token used by every test
pub const TOKEN: &str = "test-token";

/// Builds a store pointed at the mock server, with `retries` instant retries.
pub fn test_store(server: &MockServer, retries: u32) -> DiskRemoteStore {
    let client = DiskClient::new(server.uri(), TOKEN, REMOTE_DIR);
    let policy = RetryPolicy {
        retries,
        base_delay: Duration::from_millis(0),
        max_delay: Duration::from_millis(0),
    };
    DiskRemoteStore::new(client, policy)
}

/// Mounts a folder listing returning the given entry names.
pub async fn mount_listing(server: &MockServer, names: &[&str]) {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|n| serde_json::json!({ "name": n }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", REMOTE_DIR))
        .and(query_param("fields", "items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_embedded": { "items": items }
        })))
        .mount(server)
        .await;
}

/// Mounts a digest response for one entry.
pub async fn mount_digest(server: &MockServer, name: &str, md5: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", format!("{REMOTE_DIR}/{name}")))
        .and(query_param("fields", "md5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "md5": md5 })),
        )
        .mount(server)
        .await;
}

/// Mounts the two-step upload flow: target URL request plus the PUT sink.
pub async fn mount_upload(server: &MockServer, name: &str, overwrite: bool) {
    let href = format!("{}/upload-target/{name}", server.uri());

    Mock::given(method("GET"))
        .and(path("/upload"))
        .and(query_param("path", format!("{REMOTE_DIR}/{name}")))
        .and(query_param("overwrite", if overwrite { "true" } else { "false" }))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "href": href })),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/upload-target/{name}")))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
}
