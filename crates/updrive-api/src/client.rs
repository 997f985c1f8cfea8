//! Disk REST API client
//!
//! Typed HTTP client for the remote disk's resources API. Handles bearer
//! authentication, query construction and JSON deserialization. Each method
//! performs exactly one attempt; retry with backoff is layered on top by
//! [`DiskRemoteStore`](crate::store::DiskRemoteStore).
//!
//! ## Wire contract
//!
//! - `GET {base}?path=P&fields=items` → listing of the folder
//! - `GET {base}?path=P&fields=md5` → digest of one entry (404 = absent)
//! - `GET {base}?path=P` → existence probe (200 = exists)
//! - `GET {base}/upload?path=P&overwrite=B` → upload target URL, then
//!   `PUT` of the raw bytes to that URL
//! - `DELETE {base}?path=P&permanently=true` → 204 done / 202 accepted

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use updrive_core::config::RemoteConfig;

// ============================================================================
// API response types
// ============================================================================

/// Response from a folder listing request (`fields=items`)
#[derive(Debug, Deserialize)]
struct ListingResponse {
    /// Folder contents live under `_embedded.items`
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedItems>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedItems {
    items: Vec<ListingItem>,
}

/// A single entry from a folder listing
#[derive(Debug, Deserialize)]
struct ListingItem {
    name: String,
}

/// Response from a digest request (`fields=md5`)
#[derive(Debug, Deserialize)]
struct DigestResponse {
    md5: Option<String>,
}

/// Response from an upload-target request
#[derive(Debug, Deserialize)]
struct UploadTarget {
    /// URL the file bytes must be `PUT` to
    href: String,
}

// ============================================================================
// DiskClient
// ============================================================================

/// HTTP client for the disk resources API
///
/// Wraps `reqwest::Client` with the base URL, the bearer credential and the
/// remote folder path. The underlying connection pool is shared for the
/// whole process lifetime and released when the client is dropped.
pub struct DiskClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL of the resources API
    base_url: String,
    /// Bearer credential
    token: String,
    /// Remote folder receiving the mirror
    remote_dir: String,
}

impl DiskClient {
    /// Creates a new client for the given endpoint and remote folder
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        remote_dir: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            remote_dir: remote_dir.into(),
        }
    }

    /// Creates a client from the remote section of the configuration
    pub fn from_config(remote: &RemoteConfig, remote_dir: impl Into<String>) -> Self {
        Self::new(&remote.base_url, &remote.token, remote_dir)
    }

    /// Remote path of an entry inside the mirrored folder
    fn entry_path(&self, name: &str) -> String {
        format!("{}/{}", self.remote_dir, name)
    }

    /// Authenticated request builder for `path` relative to the base URL
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.token)
    }

    /// Lists the names of all entries in the remote folder
    ///
    /// A folder with no `_embedded` block (or no items) is an empty folder,
    /// not an error.
    pub async fn list_names(&self) -> Result<Vec<String>> {
        let response = self
            .request(Method::GET, "")
            .query(&[("path", self.remote_dir.as_str()), ("fields", "items")])
            .send()
            .await
            .context("Listing request failed")?
            .error_for_status()
            .context("Listing request rejected")?;

        let listing: ListingResponse = response
            .json()
            .await
            .context("Failed to parse listing response")?;

        let names: Vec<String> = listing
            .embedded
            .map(|e| e.items.into_iter().map(|item| item.name).collect())
            .unwrap_or_default();

        debug!(count = names.len(), "Remote listing fetched");
        Ok(names)
    }

    /// Fetches the MD5 digest of one remote entry
    ///
    /// Returns `Ok(None)` when the entry does not exist (404) or the store
    /// reports no digest for it.
    pub async fn digest_of(&self, name: &str) -> Result<Option<String>> {
        let path = self.entry_path(name);
        let response = self
            .request(Method::GET, "")
            .query(&[("path", path.as_str()), ("fields", "md5")])
            .send()
            .await
            .with_context(|| format!("Digest request for '{name}' failed"))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(name, "Remote entry absent during digest fetch");
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .with_context(|| format!("Digest request for '{name}' rejected"))?;

        let digest: DigestResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse digest response for '{name}'"))?;

        Ok(digest.md5)
    }

    /// Checks whether an entry exists in the remote folder
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.entry_path(name);
        let response = self
            .request(Method::GET, "")
            .query(&[("path", path.as_str())])
            .send()
            .await
            .with_context(|| format!("Existence probe for '{name}' failed"))?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => {
                response
                    .error_for_status()
                    .with_context(|| format!("Existence probe for '{name}' rejected"))?;
                // Unexpected non-200 success counts as present
                Ok(true)
            }
        }
    }

    /// Uploads `bytes` as `name`, in two steps
    ///
    /// First asks the API for an upload target URL (the `overwrite` flag is
    /// resolved at this step: without it, an existing entry makes the
    /// request fail), then `PUT`s the raw bytes to that URL.
    pub async fn upload(&self, name: &str, bytes: Vec<u8>, overwrite: bool) -> Result<()> {
        let path = self.entry_path(name);
        let overwrite_param = if overwrite { "true" } else { "false" };

        let response = self
            .request(Method::GET, "/upload")
            .query(&[("path", path.as_str()), ("overwrite", overwrite_param)])
            .send()
            .await
            .with_context(|| format!("Upload-target request for '{name}' failed"))?
            .error_for_status()
            .with_context(|| format!("Upload-target request for '{name}' rejected"))?;

        let target: UploadTarget = response
            .json()
            .await
            .with_context(|| format!("Failed to parse upload target for '{name}'"))?;

        debug!(name, href = %target.href, "Upload target acquired");

        let size = bytes.len();
        self.client
            .put(&target.href)
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Upload of '{name}' failed"))?
            .error_for_status()
            .with_context(|| format!("Upload of '{name}' rejected"))?;

        debug!(name, size, overwrite, "Upload completed");
        Ok(())
    }

    /// Permanently deletes an entry from the remote folder
    ///
    /// The API answers 204 when the delete completed synchronously and 202
    /// when it was accepted for asynchronous processing; both count as
    /// success. Any other success status is unexpected but non-fatal.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.entry_path(name);
        let response = self
            .request(Method::DELETE, "")
            .query(&[("path", path.as_str()), ("permanently", "true")])
            .send()
            .await
            .with_context(|| format!("Delete request for '{name}' failed"))?
            .error_for_status()
            .with_context(|| format!("Delete request for '{name}' rejected"))?;

        match response.status() {
            StatusCode::NO_CONTENT => debug!(name, "Remote entry deleted"),
            StatusCode::ACCEPTED => debug!(name, "Remote delete accepted, completing async"),
            status => warn!(name, %status, "Unexpected status for delete"),
        }
        Ok(())
    }
}
