//! File identity and the up-to-date test
//!
//! A replica file is current only when its name, timestamps, length and
//! content digest all match the source. Metadata is checked first so the
//! digests are only computed for files that could still be equal.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use mirror_fs::io::CREATION_TIME_SETTABLE;
use mirror_fs::{Digest128, compute_file_digest};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Snapshot of one file's metadata, taken while indexing a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    /// `None` where the platform or filesystem does not report it
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

impl FileRecord {
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        Self {
            absolute_path: path.into(),
            size_bytes: metadata.len(),
            created: metadata.created().ok(),
            modified: metadata.modified().ok(),
        }
    }

    /// Read a record straight from the filesystem.
    pub fn read(path: &Path) -> Result<Self> {
        let metadata =
            std::fs::metadata(path).map_err(|e| mirror_fs::Error::io(path, e))?;
        Ok(Self::from_metadata(path, &metadata))
    }

    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.absolute_path.file_name()
    }

    /// Content digest, read from disk on every call.
    pub fn digest(&self) -> Result<Digest128> {
        Ok(compute_file_digest(&self.absolute_path)?)
    }
}

/// How much evidence is required before a replica file counts as current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Metadata and MD5 digest must match
    #[default]
    Content,
    /// Name, timestamps and length only; file bodies are never read
    Metadata,
}

/// Stateless equality test between a source file and its replica counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileComparer {
    mode: CompareMode,
}

impl FileComparer {
    pub fn new(mode: CompareMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    /// Whether `replica` is an up-to-date copy of `source`.
    ///
    /// # Errors
    ///
    /// Digest read failures propagate; a file that cannot be read cannot be
    /// classified.
    pub fn equals(&self, source: &FileRecord, replica: &FileRecord) -> Result<bool> {
        if !metadata_matches(source, replica) {
            return Ok(false);
        }

        match self.mode {
            CompareMode::Metadata => Ok(true),
            CompareMode::Content => {
                let (source_digest, replica_digest) = (source.digest()?, replica.digest()?);
                if source_digest != replica_digest {
                    tracing::trace!(
                        path = %replica.absolute_path.display(),
                        source = %source_digest,
                        replica = %replica_digest,
                        "content digest differs"
                    );
                }
                Ok(source_digest == replica_digest)
            }
        }
    }
}

/// Name, creation time, last-write time and length comparison.
///
/// Creation time only counts where it can be written back to the replica,
/// otherwise no copy could ever satisfy it.
pub fn metadata_matches(source: &FileRecord, replica: &FileRecord) -> bool {
    source.file_name() == replica.file_name()
        && (!CREATION_TIME_SETTABLE || source.created == replica.created)
        && source.modified == replica.modified
        && source.size_bytes == replica.size_bytes
}
