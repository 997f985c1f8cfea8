//! PassReport - summary of one reconciliation pass

use chrono::{DateTime, Utc};

use super::newtypes::PassId;

/// Summary of a completed reconciliation pass
///
/// Accumulated by the reconciler as it works through the deletion and
/// convergence passes, then logged by the session. Errors recorded here
/// are the non-fatal per-file kind; a pass that aborted entirely (for
/// example on a scan failure) never produces a report.
#[derive(Debug, Clone)]
pub struct PassReport {
    /// Identifier correlating all log lines of this pass
    pub pass_id: PassId,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// Remote entries deleted because they have no local counterpart
    pub deleted: u32,
    /// New files uploaded (overwrite=false)
    pub uploaded_new: u32,
    /// Changed files re-uploaded (overwrite=true)
    pub uploaded_changed: u32,
    /// Files whose digests matched; no action taken
    pub unchanged: u32,
    /// Non-fatal per-file failures, in occurrence order
    pub errors: Vec<String>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassReport {
    /// Create an empty report for a pass starting now
    #[must_use]
    pub fn new() -> Self {
        Self {
            pass_id: PassId::new(),
            started_at: Utc::now(),
            deleted: 0,
            uploaded_new: 0,
            uploaded_changed: 0,
            unchanged: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Total number of mutating operations issued
    #[must_use]
    pub fn actions(&self) -> u32 {
        self.deleted + self.uploaded_new + self.uploaded_changed
    }

    /// Whether the pass completed without any per-file failure
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Default for PassReport {
    fn default() -> Self {
        Self::new()
    }
}
