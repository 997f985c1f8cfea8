//! The diff/converge algorithm
//!
//! One [`Reconciler::run_pass`] call converges the remote folder to the
//! local directory in three ordered passes:
//!
//! 1. **Deletion**: remote entries with no local counterpart are deleted
//!    first, so stale objects never outlive an observed local absence.
//! 2. **Digest**: names present on both sides get one digest round-trip,
//!    recorded in a pass-scoped [`TrackedState`]. Deletion runs first so
//!    that only its survivors pay for the round-trip.
//! 3. **Convergence**: local-only names upload without overwrite; names
//!    whose tracked digest differs (or is unknown) upload with overwrite;
//!    matching digests are left alone.
//!
//! A failed remote operation is logged and counted, and the pass moves on
//! to the next file. There is no rollback and no retry at this layer; the
//! transport below the port has already spent its retry budget.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use updrive_core::domain::newtypes::FileName;
use updrive_core::domain::report::PassReport;
use updrive_core::domain::snapshot::{LocalSnapshot, RemoteListing, TrackedState};
use updrive_core::ports::IRemoteStore;

use crate::inventory::LocalInventory;

/// One-directional reconciliation engine
///
/// Holds the local scanner and the remote store port. All state involved
/// in a pass is created inside [`run_pass`](Reconciler::run_pass) and
/// dropped at its end; the reconciler itself carries nothing between
/// passes.
pub struct Reconciler {
    inventory: LocalInventory,
    store: Arc<dyn IRemoteStore>,
}

impl Reconciler {
    /// Creates a reconciler over the given inventory and remote store
    pub fn new(inventory: LocalInventory, store: Arc<dyn IRemoteStore>) -> Self {
        Self { inventory, store }
    }

    /// Executes one full reconciliation pass
    ///
    /// # Errors
    /// Only a local scan failure aborts the pass. Remote failures are
    /// absorbed: a failed listing degrades to an empty one (deleting
    /// nothing, re-uploading idempotently) and failed per-file operations
    /// are recorded in the report.
    #[tracing::instrument(skip(self))]
    pub async fn run_pass(&self) -> Result<PassReport> {
        let start = Instant::now();
        let mut report = PassReport::new();

        info!(
            pass_id = %report.pass_id,
            dir = %self.inventory.dir().display(),
            "Reconciliation pass starting"
        );

        let local = self
            .inventory
            .scan()
            .await
            .context("Local directory scan failed")?;

        // An empty snapshot short-circuits the whole pass. A transient
        // local read failure must never translate into wiping the remote
        // folder.
        if local.is_empty() {
            info!(pass_id = %report.pass_id, "Local directory is empty, nothing to do");
            report.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(report);
        }

        let remote = match self.store.list().await {
            Ok(names) => RemoteListing::new(names),
            Err(err) => {
                // Every local file then looks new; re-uploading without
                // overwrite is idempotent and safe, unlike deleting from
                // a listing we do not trust.
                warn!(
                    pass_id = %report.pass_id,
                    error = %format!("{err:#}"),
                    "Remote listing failed, treating as empty"
                );
                report.errors.push(format!("list: {err:#}"));
                RemoteListing::empty()
            }
        };

        debug!(
            pass_id = %report.pass_id,
            local_files = local.len(),
            remote_entries = remote.len(),
            "Snapshots collected"
        );

        self.delete_stale(&local, &remote, &mut report).await;
        let tracked = self.fetch_remote_digests(&local, &remote).await;
        self.converge(&local, &remote, &tracked, &mut report).await;

        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pass_id = %report.pass_id,
            deleted = report.deleted,
            uploaded_new = report.uploaded_new,
            uploaded_changed = report.uploaded_changed,
            unchanged = report.unchanged,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "Reconciliation pass completed"
        );

        Ok(report)
    }

    /// Deletion pass: remove remote entries absent from the local snapshot
    async fn delete_stale(
        &self,
        local: &LocalSnapshot,
        remote: &RemoteListing,
        report: &mut PassReport,
    ) {
        for name in remote.iter() {
            if local.contains(name) {
                continue;
            }
            info!(%name, "Deleting remote entry with no local counterpart");
            match self.store.delete(name).await {
                Ok(()) => report.deleted += 1,
                Err(err) => {
                    warn!(%name, error = %format!("{err:#}"), "Delete failed");
                    report.errors.push(format!("delete '{name}': {err:#}"));
                }
            }
        }
    }

    /// Digest pass: fetch remote digests for names present on both sides
    ///
    /// A digest that cannot be fetched (absent or failed) is recorded as
    /// unknown, which the convergence pass treats as changed. Re-uploading
    /// an identical file is safe; skipping a changed one is not.
    async fn fetch_remote_digests(
        &self,
        local: &LocalSnapshot,
        remote: &RemoteListing,
    ) -> TrackedState {
        let mut tracked = TrackedState::new();

        for name in remote.iter() {
            if !local.contains(name) {
                continue;
            }
            match self.store.digest_of(name).await {
                Ok(digest) => {
                    if digest.is_none() {
                        debug!(%name, "Remote entry vanished between listing and digest fetch");
                    }
                    tracked.record(name.clone(), digest);
                }
                Err(err) => {
                    warn!(%name, error = %format!("{err:#}"), "Digest fetch failed, will overwrite");
                    tracked.record(name.clone(), None);
                }
            }
        }

        tracked
    }

    /// Convergence pass: upload new and changed files
    async fn converge(
        &self,
        local: &LocalSnapshot,
        remote: &RemoteListing,
        tracked: &TrackedState,
        report: &mut PassReport,
    ) {
        for (name, digest) in local.iter() {
            if !remote.contains(name) {
                info!(%name, "Uploading new file");
                self.upload_file(name, false, report).await;
            } else if !tracked.matches(name, digest) {
                info!(%name, "Local content changed, overwriting remote copy");
                self.upload_file(name, true, report).await;
            } else {
                debug!(%name, "Digests match, no action");
                report.unchanged += 1;
            }
        }
    }

    /// Reads a file's bytes and uploads them, recording the outcome
    ///
    /// The file is read at action time, not scan time. A file deleted in
    /// between is simply skipped; the next pass will observe its absence
    /// and delete the remote copy if one was created.
    async fn upload_file(&self, name: &FileName, overwrite: bool, report: &mut PassReport) {
        let path = self.inventory.dir().join(name.as_str());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(%name, "File vanished since scan, skipping upload");
                return;
            }
            Err(err) => {
                warn!(%name, error = %err, "Failed to read file for upload");
                report.errors.push(format!("read '{name}': {err}"));
                return;
            }
        };

        match self.store.upload(name, bytes, overwrite).await {
            Ok(()) => {
                if overwrite {
                    report.uploaded_changed += 1;
                } else {
                    report.uploaded_new += 1;
                }
            }
            Err(err) => {
                warn!(%name, error = %format!("{err:#}"), "Upload failed");
                report.errors.push(format!("upload '{name}': {err:#}"));
            }
        }
    }
}
