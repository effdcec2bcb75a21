//! Tree comparison
//!
//! Classifies every directory and file under the two roots into the five
//! buckets of a [`DiffResult`]. Directories and files are indexed
//! independently, so a name that is a file on one side and a directory on the
//! other shows up in both a directory bucket and a file bucket.

use std::collections::BTreeMap;
use std::path::Path;

use mirror_fs::NormalizedPath;

use crate::Result;
use crate::fingerprint::{CompareMode, FileComparer, FileRecord};
use crate::tree::TreeSnapshot;

/// The classified set of mutations needed to converge a replica.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Missing from the replica, ordered ancestors first
    pub directories_to_add: Vec<NormalizedPath>,
    /// Absent from the source, ordered descendants first
    pub directories_to_remove: Vec<NormalizedPath>,
    /// Source records for files the replica lacks
    pub files_to_add: BTreeMap<NormalizedPath, FileRecord>,
    /// Source records for files whose replica copy is stale
    pub files_to_update: BTreeMap<NormalizedPath, FileRecord>,
    /// Replica records for files absent from the source
    pub files_to_remove: BTreeMap<NormalizedPath, FileRecord>,
}

impl DiffResult {
    /// True when the replica already mirrors the source.
    pub fn is_empty(&self) -> bool {
        self.directories_to_add.is_empty()
            && self.directories_to_remove.is_empty()
            && self.files_to_add.is_empty()
            && self.files_to_update.is_empty()
            && self.files_to_remove.is_empty()
    }

    /// Total number of item operations the diff schedules.
    pub fn len(&self) -> usize {
        self.directories_to_add.len()
            + self.directories_to_remove.len()
            + self.files_to_add.len()
            + self.files_to_update.len()
            + self.files_to_remove.len()
    }
}

/// Stateless comparer of a source tree against a replica tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeComparer {
    files: FileComparer,
}

impl TreeComparer {
    pub fn new(mode: CompareMode) -> Self {
        Self {
            files: FileComparer::new(mode),
        }
    }

    pub fn mode(&self) -> CompareMode {
        self.files.mode()
    }

    /// Compare `source_root` against `replica_root`.
    ///
    /// Both roots must exist. Any enumeration or digest failure aborts the
    /// whole comparison, since a file that cannot be read cannot be
    /// classified.
    pub fn compare(&self, source_root: &Path, replica_root: &Path) -> Result<DiffResult> {
        let source = TreeSnapshot::scan(source_root)?;
        let replica = TreeSnapshot::scan(replica_root)?;
        self.compare_snapshots(&source, &replica)
    }

    /// Classify two already-scanned trees.
    pub fn compare_snapshots(&self, source: &TreeSnapshot, replica: &TreeSnapshot) -> Result<DiffResult> {
        let mut directories_to_add: Vec<_> = source
            .directories
            .difference(&replica.directories)
            .cloned()
            .collect();
        directories_to_add.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));

        let mut directories_to_remove: Vec<_> = replica
            .directories
            .difference(&source.directories)
            .cloned()
            .collect();
        directories_to_remove.sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| a.cmp(b)));

        let mut diff = DiffResult {
            directories_to_add,
            directories_to_remove,
            ..DiffResult::default()
        };

        for (path, source_record) in source.files.iter() {
            match replica.files.get(path) {
                None => {
                    diff.files_to_add.insert(path.clone(), source_record.clone());
                }
                Some(replica_record) => {
                    if !self.files.equals(source_record, replica_record)? {
                        diff.files_to_update.insert(path.clone(), source_record.clone());
                    }
                }
            }
        }

        for (path, replica_record) in replica.files.iter() {
            if !source.files.contains(path) {
                diff.files_to_remove.insert(path.clone(), replica_record.clone());
            }
        }

        tracing::debug!(
            directories_to_add = diff.directories_to_add.len(),
            directories_to_remove = diff.directories_to_remove.len(),
            files_to_add = diff.files_to_add.len(),
            files_to_update = diff.files_to_update.len(),
            files_to_remove = diff.files_to_remove.len(),
            "compared trees"
        );

        Ok(diff)
    }
}
