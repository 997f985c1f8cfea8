//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for the values the reconciler compares and keys
//! on. Each newtype ensures validity at construction time, so the engine
//! never has to re-check names or digests mid-pass.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// FileName
// ============================================================================

/// A file name within one directory snapshot
///
/// Names are flat: the watched directory is scanned non-recursively, so a
/// valid name never contains a path separator. Uniqueness within a snapshot
/// is guaranteed by the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(String);

impl FileName {
    /// Create a validated `FileName`
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidFileName`] if the name is empty or
    /// contains `/`, `\` or NUL.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::InvalidFileName("<empty>".to_string()));
        }
        if name.contains('/') || name.contains('\\') || name.contains('\0') {
            return Err(DomainError::InvalidFileName(name));
        }
        Ok(Self(name))
    }

    /// The name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ContentDigest
// ============================================================================

/// Hex-encoded MD5 digest of a file's contents
///
/// Digest equality is the sole change criterion during reconciliation:
/// modification time, size and name casing are irrelevant. Stored
/// lowercase so that comparisons are byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

/// Length of a hex-encoded MD5 digest
const DIGEST_HEX_LEN: usize = 32;

impl ContentDigest {
    /// Create a validated `ContentDigest`, normalizing to lowercase
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidDigest`] unless the input is exactly
    /// 32 hexadecimal characters.
    pub fn new(digest: impl Into<String>) -> Result<Self, DomainError> {
        let digest = digest.into();
        if digest.len() != DIGEST_HEX_LEN || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidDigest(digest));
        }
        Ok(Self(digest.to_ascii_lowercase()))
    }

    /// The digest as a lowercase hex string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentDigest {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// PassId
// ============================================================================

/// Identifier for one reconciliation pass
///
/// Appears in log lines so that all operations belonging to one pass can
/// be correlated. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassId(Uuid);

impl PassId {
    /// Create a new random PassId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PassId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
