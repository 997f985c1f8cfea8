//! Pass-scoped snapshots of local and remote state
//!
//! All three collections here are created at the start of a reconciliation
//! pass and discarded at its end. `TrackedState` in particular is derived
//! data with no authority over outcomes: it caches remote digests for the
//! duration of one pass only.

use std::collections::HashMap;

use super::newtypes::{ContentDigest, FileName};

// ============================================================================
// LocalSnapshot
// ============================================================================

/// Mapping of name to content digest for the watched directory at one instant
///
/// Recomputed fully on every pass. Iteration order is unspecified;
/// consumers must not depend on it.
#[derive(Debug, Clone, Default)]
pub struct LocalSnapshot {
    files: HashMap<FileName, ContentDigest>,
}

impl LocalSnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file and its digest
    ///
    /// A later insert for the same name replaces the earlier digest; the
    /// filesystem guarantees name uniqueness so this only happens in tests.
    pub fn insert(&mut self, name: FileName, digest: ContentDigest) {
        self.files.insert(name, digest);
    }

    /// Digest for `name`, if the file was present at scan time
    pub fn digest_of(&self, name: &FileName) -> Option<&ContentDigest> {
        self.files.get(name)
    }

    pub fn contains(&self, name: &FileName) -> bool {
        self.files.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Iterate over `(name, digest)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&FileName, &ContentDigest)> {
        self.files.iter()
    }
}

impl FromIterator<(FileName, ContentDigest)> for LocalSnapshot {
    fn from_iter<I: IntoIterator<Item = (FileName, ContentDigest)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// RemoteListing
// ============================================================================

/// Names currently present in the remote folder, from one listing call
///
/// Digests are not included; they are fetched per name during the digest
/// pass, and only for names that survive the deletion pass.
#[derive(Debug, Clone, Default)]
pub struct RemoteListing {
    names: Vec<FileName>,
}

impl RemoteListing {
    #[must_use]
    pub fn new(names: Vec<FileName>) -> Self {
        Self { names }
    }

    /// An empty listing, used when the listing call fails
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &FileName) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileName> {
        self.names.iter()
    }
}

impl FromIterator<FileName> for RemoteListing {
    fn from_iter<I: IntoIterator<Item = FileName>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// TrackedState
// ============================================================================

/// Last-known remote digests for names present in both snapshots
///
/// Built during the digest pass. A recorded `None` means the remote store
/// reported the name absent between the listing and the digest fetch; a
/// name that was never recorded is equally unknown. Both cases must be
/// treated as "changed" by the convergence pass, which is why the only
/// comparison entry point is [`matches`](TrackedState::matches).
#[derive(Debug, Clone, Default)]
pub struct TrackedState {
    digests: HashMap<FileName, Option<ContentDigest>>,
}

impl TrackedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the remote digest for a name (or `None` if it was absent)
    pub fn record(&mut self, name: FileName, digest: Option<ContentDigest>) {
        self.digests.insert(name, digest);
    }

    /// Whether the tracked remote digest is known and equal to `local`
    ///
    /// Returns `false` for unknown names and for names whose digest fetch
    /// came back absent, so the caller re-uploads in every unsure case.
    pub fn matches(&self, name: &FileName, local: &ContentDigest) -> bool {
        matches!(self.digests.get(name), Some(Some(remote)) if remote == local)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
