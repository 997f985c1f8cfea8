//! DiskRemoteStore - IRemoteStore implementation for the disk REST API
//!
//! Wraps [`DiskClient`] and fulfils the port contract, running every
//! operation through the transport retry layer. Names coming back from the
//! listing are validated into [`FileName`]s; entries the domain cannot
//! represent are skipped with a warning rather than failing the listing.

use anyhow::{Context, Result};
use tracing::warn;

use updrive_core::config::Config;
use updrive_core::domain::newtypes::{ContentDigest, FileName};
use updrive_core::ports::IRemoteStore;

use crate::client::DiskClient;
use crate::retry::{with_retry, RetryPolicy};

/// Remote store adapter backed by the disk REST API
pub struct DiskRemoteStore {
    client: DiskClient,
    policy: RetryPolicy,
}

impl DiskRemoteStore {
    /// Creates a store from an existing client and retry policy
    pub fn new(client: DiskClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Creates a store wired from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: DiskClient::from_config(&config.remote, config.sync.remote_dir.clone()),
            policy: RetryPolicy::from_config(&config.transport),
        }
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DiskRemoteStore {
    async fn list(&self) -> Result<Vec<FileName>> {
        let names = with_retry(&self.policy, "list", || self.client.list_names()).await?;

        let mut out = Vec::with_capacity(names.len());
        for raw in names {
            match FileName::new(raw.clone()) {
                Ok(name) => out.push(name),
                Err(err) => warn!(name = %raw, error = %err, "Skipping unrepresentable entry"),
            }
        }
        Ok(out)
    }

    async fn digest_of(&self, name: &FileName) -> Result<Option<ContentDigest>> {
        let raw = with_retry(&self.policy, "digest_of", || {
            self.client.digest_of(name.as_str())
        })
        .await?;

        match raw {
            Some(hex) => {
                let digest = ContentDigest::new(hex)
                    .with_context(|| format!("Malformed digest for '{name}'"))?;
                Ok(Some(digest))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, name: &FileName) -> Result<bool> {
        with_retry(&self.policy, "exists", || self.client.exists(name.as_str())).await
    }

    async fn upload(&self, name: &FileName, bytes: Vec<u8>, overwrite: bool) -> Result<()> {
        with_retry(&self.policy, "upload", || {
            self.client.upload(name.as_str(), bytes.clone(), overwrite)
        })
        .await
    }

    async fn delete(&self, name: &FileName) -> Result<()> {
        with_retry(&self.policy, "delete", || self.client.delete(name.as_str())).await
    }
}
