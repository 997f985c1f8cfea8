//! Local directory scanner
//!
//! Produces a [`LocalSnapshot`] of the watched directory: every regular
//! file mapped to the hex MD5 of its contents. Scanning is flat by design;
//! subdirectories, symlinks and special files are skipped silently.
//!
//! Digests are computed by streaming each file through the hasher in
//! fixed-size chunks, so memory use is independent of file size.

use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use updrive_core::domain::newtypes::{ContentDigest, FileName};
use updrive_core::domain::snapshot::LocalSnapshot;

use crate::ScanError;

/// Chunk size for streaming file contents through the hasher
const HASH_CHUNK_SIZE: usize = 4096;

/// Scanner for the watched directory
#[derive(Debug, Clone)]
pub struct LocalInventory {
    dir: PathBuf,
}

impl LocalInventory {
    /// Creates an inventory over `dir`
    ///
    /// The directory's existence is checked at process startup, not here:
    /// a directory that disappears later surfaces as a per-pass
    /// [`ScanError`], which the session survives.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The watched directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshots the directory: every regular file name mapped to its digest
    ///
    /// # Errors
    /// Returns [`ScanError`] if the directory cannot be listed or a file
    /// cannot be read (including files that vanish between listing and
    /// hashing). The caller treats this as "nothing to sync this pass".
    pub async fn scan(&self) -> Result<LocalSnapshot, ScanError> {
        let mut entries =
            tokio::fs::read_dir(&self.dir)
                .await
                .map_err(|source| ScanError::ListFailed {
                    path: self.dir.clone(),
                    source,
                })?;

        let mut snapshot = LocalSnapshot::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| ScanError::ListFailed {
                path: self.dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|source| ScanError::ReadFailed {
                    path: path.clone(),
                    source,
                })?;

            // Flat scan: only regular files count. file_type() does not
            // follow symlinks, so links are skipped along with directories.
            if !file_type.is_file() {
                debug!(path = %path.display(), "Skipping non-regular entry");
                continue;
            }

            let Some(raw_name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "Skipping entry with non-UTF-8 name");
                continue;
            };
            let name = match FileName::new(raw_name) {
                Ok(name) => name,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping entry");
                    continue;
                }
            };

            let digest = digest_file(&path)
                .await
                .map_err(|source| ScanError::ReadFailed {
                    path: path.clone(),
                    source,
                })?;

            snapshot.insert(name, digest);
        }

        debug!(dir = %self.dir.display(), files = snapshot.len(), "Local snapshot built");
        Ok(snapshot)
    }
}

/// Streams a file through MD5 in [`HASH_CHUNK_SIZE`] chunks
async fn digest_file(path: &Path) -> io::Result<ContentDigest> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let hex = hex::encode(hasher.finalize());
    Ok(ContentDigest::new(hex).expect("hex-encoded MD5 is always a valid digest"))
}
