//! Digest fetch behavior: present, absent and malformed digests.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use updrive_core::domain::newtypes::FileName;
use updrive_core::ports::IRemoteStore;

use crate::common;

#[tokio::test]
async fn test_digest_of_existing_entry() {
    let server = MockServer::start().await;
    common::mount_digest(&server, "a.txt", "d41d8cd98f00b204e9800998ecf8427e").await;

    let store = common::test_store(&server, 0);
    let digest = store
        .digest_of(&FileName::new("a.txt").unwrap())
        .await
        .expect("digest fetch failed");

    assert_eq!(
        digest.map(|d| d.as_str().to_string()),
        Some("d41d8cd98f00b204e9800998ecf8427e".to_string())
    );
}

#[tokio::test]
async fn test_digest_of_absent_entry_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", format!("{}/gone.txt", common::REMOTE_DIR)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Resource not found",
            "error": "DiskNotFoundError"
        })))
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    let digest = store
        .digest_of(&FileName::new("gone.txt").unwrap())
        .await
        .expect("absent entry must not be an error");

    assert!(digest.is_none());
}

#[tokio::test]
async fn test_digest_missing_field_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("fields", "md5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    let digest = store
        .digest_of(&FileName::new("folderish").unwrap())
        .await
        .expect("digest fetch failed");

    assert!(digest.is_none());
}

#[tokio::test]
async fn test_digest_malformed_value_is_error() {
    let server = MockServer::start().await;
    common::mount_digest(&server, "a.txt", "not-a-digest").await;

    let store = common::test_store(&server, 0);
    let result = store.digest_of(&FileName::new("a.txt").unwrap()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_exists_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", format!("{}/here.txt", common::REMOTE_DIR)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "here.txt"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", format!("{}/gone.txt", common::REMOTE_DIR)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    assert!(store
        .exists(&FileName::new("here.txt").unwrap())
        .await
        .unwrap());
    assert!(!store
        .exists(&FileName::new("gone.txt").unwrap())
        .await
        .unwrap());
}
