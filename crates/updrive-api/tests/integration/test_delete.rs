//! Delete behavior: synchronous, asynchronous and missing entries.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use updrive_core::domain::newtypes::FileName;
use updrive_core::ports::IRemoteStore;

use crate::common;

async fn mount_delete(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("DELETE"))
        .and(path("/"))
        .and(query_param("path", format!("{}/{name}", common::REMOTE_DIR)))
        .and(query_param("permanently", "true"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delete_completed_synchronously() {
    let server = MockServer::start().await;
    mount_delete(&server, "stale.txt", 204).await;

    let store = common::test_store(&server, 0);
    store
        .delete(&FileName::new("stale.txt").unwrap())
        .await
        .expect("delete failed");
}

#[tokio::test]
async fn test_delete_accepted_async() {
    let server = MockServer::start().await;
    mount_delete(&server, "big.bin", 202).await;

    let store = common::test_store(&server, 0);
    store
        .delete(&FileName::new("big.bin").unwrap())
        .await
        .expect("accepted delete must count as success");
}

#[tokio::test]
async fn test_delete_missing_entry_is_error() {
    let server = MockServer::start().await;
    mount_delete(&server, "gone.txt", 404).await;

    let store = common::test_store(&server, 0);
    assert!(store
        .delete(&FileName::new("gone.txt").unwrap())
        .await
        .is_err());
}
