//! Remote store port (driven/secondary port)
//!
//! Interface for the remote object-storage folder that mirrors the watched
//! directory. The production implementation talks to a disk-style REST API
//! over HTTPS; tests substitute an in-memory store.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - Retry with backoff is an adapter responsibility: every method here is
//!   expected to have exhausted its transport retry budget before returning
//!   an error. The reconciler never retries; a failed operation is logged
//!   and the pass continues with the next file.
//! - `digest_of` returns `Ok(None)` for a name the store no longer has.
//!   "Not found" counts as "no longer conflicting", not as a failure.

use crate::domain::newtypes::{ContentDigest, FileName};

/// Port trait for remote object-storage operations
///
/// One long-lived implementation instance is shared across all
/// reconciliation passes of a process; the underlying connection is owned
/// by the session and released when the session is dropped.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists the names currently present in the remote folder
    ///
    /// # Errors
    /// Returns an error after the transport retry budget is exhausted.
    /// Callers treat a failed listing as an empty one (re-uploading a file
    /// that already exists is idempotent; deleting from a wrong listing is
    /// not, and an empty listing deletes nothing).
    async fn list(&self) -> anyhow::Result<Vec<FileName>>;

    /// Fetches the content digest of a remote entry
    ///
    /// # Returns
    /// `Ok(None)` if the entry does not exist (deleted between listing and
    /// digest fetch, for example).
    async fn digest_of(&self, name: &FileName) -> anyhow::Result<Option<ContentDigest>>;

    /// Checks whether an entry exists in the remote folder
    async fn exists(&self, name: &FileName) -> anyhow::Result<bool>;

    /// Uploads `bytes` as `name`, optionally replacing an existing entry
    ///
    /// With `overwrite` false the upload is rejected by the store if the
    /// entry already exists; the reconciler only sets it for names it has
    /// just observed remotely.
    async fn upload(&self, name: &FileName, bytes: Vec<u8>, overwrite: bool)
        -> anyhow::Result<()>;

    /// Permanently deletes an entry from the remote folder
    async fn delete(&self, name: &FileName) -> anyhow::Result<()>;
}
