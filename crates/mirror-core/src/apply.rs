//! Replica mutation
//!
//! Applies a [`DiffResult`] to the replica one item at a time. Nothing is
//! atomic: a failing item is logged and recorded, and every other item is
//! still attempted. Whatever is left unresolved shows up again in the next
//! comparison.

use std::fmt;
use std::path::{Path, PathBuf};

use mirror_fs::{NormalizedPath, io};
use tracing::{debug, error, info};

use crate::compare::DiffResult;
use crate::fingerprint::FileRecord;

/// The kind of per-item mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateDirectory,
    AddFile,
    UpdateFile,
    RemoveFile,
    RemoveDirectory,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateDirectory => "create directory",
            Self::AddFile => "add file",
            Self::UpdateFile => "update file",
            Self::RemoveFile => "remove file",
            Self::RemoveDirectory => "remove directory",
        };
        f.write_str(s)
    }
}

/// One item that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub operation: Operation,
    pub path: NormalizedPath,
    pub message: String,
}

/// Outcome of applying one diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub directories_created: usize,
    pub files_added: usize,
    pub files_updated: usize,
    pub files_removed: usize,
    /// File removals skipped because the path was already gone
    pub files_already_gone: usize,
    pub directories_removed: usize,
    pub failures: Vec<ItemFailure>,
}

impl ApplyReport {
    /// True when every scheduled item was applied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of items that changed the replica.
    pub fn changes(&self) -> usize {
        self.directories_created
            + self.files_added
            + self.files_updated
            + self.files_removed
            + self.directories_removed
    }
}

/// Applies diffs to one replica root.
#[derive(Debug, Clone)]
pub struct ReplicaMutator {
    replica_root: PathBuf,
}

impl ReplicaMutator {
    pub fn new(replica_root: impl Into<PathBuf>) -> Self {
        Self {
            replica_root: replica_root.into(),
        }
    }

    pub fn replica_root(&self) -> &Path {
        &self.replica_root
    }

    /// Apply every item of `diff`.
    ///
    /// Order: directory adds, file adds, file updates, file removes,
    /// directory removes. Directories exist before files are copied into
    /// them, and a directory is only removed after the files scheduled for
    /// removal inside it are gone.
    pub fn apply(&self, diff: &DiffResult) -> ApplyReport {
        let mut report = ApplyReport::default();

        for path in &diff.directories_to_add {
            let target = path.under(&self.replica_root);
            if self.attempt(&mut report, Operation::CreateDirectory, path, || {
                io::create_dir_all(&target)
            }) {
                report.directories_created += 1;
            }
        }

        for (path, record) in &diff.files_to_add {
            let target = path.under(&self.replica_root);
            if self.attempt(&mut report, Operation::AddFile, path, || {
                io::copy_new(&record.absolute_path, &target)?;
                carry_creation_time(record, &target)
            }) {
                report.files_added += 1;
            }
        }

        for (path, record) in &diff.files_to_update {
            let target = path.under(&self.replica_root);
            if self.attempt(&mut report, Operation::UpdateFile, path, || {
                io::copy_overwrite(&record.absolute_path, &target)?;
                carry_creation_time(record, &target)
            }) {
                report.files_updated += 1;
            }
        }

        for path in diff.files_to_remove.keys() {
            let target = path.under(&self.replica_root);
            let mut removed = false;
            if self.attempt(&mut report, Operation::RemoveFile, path, || {
                removed = io::remove_file_if_exists(&target)?;
                Ok(())
            }) {
                if removed {
                    report.files_removed += 1;
                } else {
                    debug!(path = %path, "file already gone from replica");
                    report.files_already_gone += 1;
                }
            }
        }

        for path in &diff.directories_to_remove {
            let target = path.under(&self.replica_root);
            if self.attempt(&mut report, Operation::RemoveDirectory, path, || {
                io::remove_dir(&target)
            }) {
                report.directories_removed += 1;
            }
        }

        report
    }

    fn attempt<F>(&self, report: &mut ApplyReport, operation: Operation, path: &NormalizedPath, op: F) -> bool
    where
        F: FnOnce() -> mirror_fs::Result<()>,
    {
        match op() {
            Ok(()) => {
                info!(path = %path, "{} in replica: done", operation);
                true
            }
            Err(e) => {
                error!(path = %path, error = %e, "failed to {} in replica", operation);
                report.failures.push(ItemFailure {
                    operation,
                    path: path.clone(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}

fn carry_creation_time(record: &FileRecord, target: &Path) -> mirror_fs::Result<()> {
    if let Some(created) = record.created {
        io::set_created(target, created)?;
    }
    Ok(())
}
