//! Sync configuration
//!
//! A [`SyncConfig`] comes either from command-line arguments or from a TOML
//! file, and must go through [`SyncConfig::validate`] before an engine is
//! started from it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fingerprint::CompareMode;
use crate::{Error, Result};

/// Default polling granularity of the interruptible wait.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Settings for one source/replica pair.
///
/// ```toml
/// source = "/data/source"
/// replica = "/backup/replica"
/// interval_secs = 30
/// log_file = "/var/log/mirror/mirror.log"
/// compare_mode = "content"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub compare_mode: CompareMode,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SyncConfig {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval_secs,
            log_file: None,
            compare_mode: CompareMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.compare_mode = mode;
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| mirror_fs::Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check the configuration and prepare the filesystem for it.
    ///
    /// - the interval must be positive
    /// - the source must be an existing directory
    /// - the replica is created if missing, and must not be or lie inside
    ///   the source
    /// - the log file's parent directory is created if missing
    ///
    /// Source and replica come back as absolute, canonical paths.
    pub fn validate(mut self) -> Result<Self> {
        if self.interval_secs == 0 {
            return Err(Error::InvalidInterval {
                value: self.interval_secs,
            });
        }

        if !self.source.is_dir() {
            return Err(Error::SourceNotFound { path: self.source });
        }
        self.source = dunce::canonicalize(&self.source)?;

        // Runs before the replica is created
        let replica = resolve_existing_prefix(&self.replica)?;
        if replica.starts_with(&self.source) || self.source.starts_with(&replica) {
            return Err(Error::OverlappingRoots {
                source_root: self.source,
                replica,
            });
        }

        if !self.replica.exists() {
            warn!(replica = %self.replica.display(), "Replica folder was not found. Creating...");
            mirror_fs::io::create_dir_all(&self.replica)?;
        }
        mirror_fs::io::ensure_directory(&self.replica)?;
        self.replica = dunce::canonicalize(&self.replica)?;

        if let Some(log_file) = &self.log_file
            && let Some(parent) = log_file.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            mirror_fs::io::create_dir_all(parent)?;
        }

        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }

        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn resolve_existing_prefix(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = dunce::canonicalize(existing)?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let config: SyncConfig = toml::from_str(
            r#"
            source = "/a"
            replica = "/b"
            interval_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.interval(), Duration::from_secs(10));
        assert_eq!(config.compare_mode, CompareMode::Content);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_parse_metadata_mode() {
        let config: SyncConfig = toml::from_str(
            r#"
            source = "/a"
            replica = "/b"
            interval_secs = 10
            compare_mode = "metadata"
            "#,
        )
        .unwrap();

        assert_eq!(config.compare_mode, CompareMode::Metadata);
    }

    #[test]
    fn test_resolve_existing_prefix_keeps_missing_tail() {
        let temp = tempfile::TempDir::new().unwrap();
        let base = dunce::canonicalize(temp.path()).unwrap();

        let resolved = resolve_existing_prefix(&temp.path().join("not/yet/here")).unwrap();

        assert_eq!(resolved, base.join("not").join("yet").join("here"));
        assert!(!base.join("not").exists());
    }
}
