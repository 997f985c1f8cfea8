//! Two-step upload behavior: target acquisition, byte transfer, conflicts.

use wiremock::matchers::{body_bytes, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use updrive_core::domain::newtypes::FileName;
use updrive_core::ports::IRemoteStore;

use crate::common;

#[tokio::test]
async fn test_upload_new_file_puts_bytes_to_target() {
    let server = MockServer::start().await;
    let href = format!("{}/upload-target/b.txt", server.uri());

    Mock::given(method("GET"))
        .and(path("/upload"))
        .and(query_param("path", format!("{}/b.txt", common::REMOTE_DIR)))
        .and(query_param("overwrite", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "href": href })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-target/b.txt"))
        .and(body_bytes(b"file contents".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = common::test_store(&server, 0);
    store
        .upload(
            &FileName::new("b.txt").unwrap(),
            b"file contents".to_vec(),
            false,
        )
        .await
        .expect("upload failed");
}

#[tokio::test]
async fn test_upload_overwrite_flag_forwarded() {
    let server = MockServer::start().await;
    common::mount_upload(&server, "a.txt", true).await;

    let store = common::test_store(&server, 0);
    store
        .upload(&FileName::new("a.txt").unwrap(), b"v2".to_vec(), true)
        .await
        .expect("overwrite upload failed");
}

#[tokio::test]
async fn test_upload_conflict_not_retried() {
    let server = MockServer::start().await;

    // Without overwrite, an existing entry rejects the target request.
    Mock::given(method("GET"))
        .and(path("/upload"))
        .and(query_param("overwrite", "false"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Resource already exists",
            "error": "DiskResourceAlreadyExistsError"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = common::test_store(&server, 3);
    let result = store
        .upload(&FileName::new("a.txt").unwrap(), b"v1".to_vec(), false)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_upload_retries_flaky_target_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    common::mount_upload(&server, "c.txt", false).await;

    let store = common::test_store(&server, 2);
    store
        .upload(&FileName::new("c.txt").unwrap(), b"data".to_vec(), false)
        .await
        .expect("upload should recover after one 502");
}
