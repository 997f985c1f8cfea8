//! updrive Sync - One-directional reconciliation engine
//!
//! Converges a remote object-storage folder to the contents of a local
//! directory, one pass at a time:
//!
//! 1. Snapshot the local directory (names and content digests)
//! 2. List the remote folder
//! 3. Delete remote entries with no local counterpart
//! 4. Fetch remote digests for names present on both sides
//! 5. Upload new and changed files
//!
//! ## Modules
//!
//! - [`inventory`] - Local directory scanner with streaming digests
//! - [`reconciler`] - The diff/converge algorithm
//! - [`session`] - Error boundary wrapping the reconciler for the poll loop

pub mod inventory;
pub mod reconciler;
pub mod session;

use std::path::PathBuf;

use thiserror::Error;

pub use inventory::LocalInventory;
pub use reconciler::Reconciler;
pub use session::SyncSession;

/// Errors that can occur while snapshotting the local directory
///
/// A scan failure aborts the current pass only: the caller logs it and
/// tries again on the next poll. Nothing is synced from a half-read
/// directory.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The watched directory could not be listed
    #[error("Failed to list directory {path}: {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be read (it may have vanished mid-scan)
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
