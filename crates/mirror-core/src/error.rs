//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source directory is missing or not a directory
    #[error("Source directory ({path}) not found")]
    SourceNotFound { path: PathBuf },

    /// Sync interval was zero
    #[error("Synchronization interval must be a positive integer. Got: {value}")]
    InvalidInterval { value: u64 },

    /// Source and replica would overlap, so mirroring would feed on itself
    #[error("Replica {replica} must not be the source or lie inside it ({source_root})")]
    OverlappingRoots {
        source_root: PathBuf,
        replica: PathBuf,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    // Transparent wrappers for underlying errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
