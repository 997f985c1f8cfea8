//! Sync session - the error boundary around reconciliation passes
//!
//! The session owns the reconciler (and through it the remote store with
//! its connection pool) for the whole process lifetime. The pool is opened
//! once, reused across passes, and released when the session is dropped,
//! on every exit path.
//!
//! `run_once` is the line no error crosses: whatever fails inside one
//! pass is logged here and the caller's poll loop keeps running.

use tracing::{error, info};

use updrive_core::domain::report::PassReport;

use crate::reconciler::Reconciler;

/// Scoped wrapper around the reconciler for the poll loop
pub struct SyncSession {
    reconciler: Reconciler,
}

impl SyncSession {
    /// Opens a session over the given reconciler
    pub fn new(reconciler: Reconciler) -> Self {
        info!("Sync session opened");
        Self { reconciler }
    }

    /// Runs a single reconciliation pass, absorbing every failure
    ///
    /// Returns the pass report on success and `None` when the pass
    /// aborted; either way the error has already been logged and the
    /// process keeps running.
    pub async fn run_once(&self) -> Option<PassReport> {
        match self.reconciler.run_pass().await {
            Ok(report) => Some(report),
            Err(err) => {
                error!(error = %format!("{err:#}"), "Reconciliation pass aborted");
                None
            }
        }
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        // Dropping the reconciler releases the store and its connections.
        info!("Sync session closed, remote connection released");
    }
}
