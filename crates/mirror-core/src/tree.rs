//! Per-root indexes of directories and files, keyed by relative path

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use mirror_fs::{NormalizedPath, io};

use crate::Result;
use crate::fingerprint::FileRecord;

/// Relative paths of every directory beneath a root.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    paths: BTreeSet<NormalizedPath>,
}

impl DirectoryTree {
    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths present here but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a DirectoryTree) -> impl Iterator<Item = &'a NormalizedPath> {
        self.paths.difference(&other.paths)
    }
}

/// Relative path to file record, for every file beneath a root.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: HashMap<NormalizedPath, FileRecord>,
}

impl FileIndex {
    pub fn get(&self, path: &NormalizedPath) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.records.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedPath, &FileRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Directories and files found under one root during a single walk.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub root: PathBuf,
    pub directories: DirectoryTree,
    pub files: FileIndex,
}

impl TreeSnapshot {
    /// Walk `root` recursively and index everything beneath it.
    ///
    /// # Errors
    ///
    /// Fails if `root` is missing or any entry cannot be read.
    pub fn scan(root: &Path) -> Result<Self> {
        let entries = io::walk_tree(root)?;

        let mut directories = DirectoryTree::default();
        for dir in &entries.directories {
            directories.paths.insert(NormalizedPath::relative_to(root, dir)?);
        }

        let mut files = FileIndex::default();
        for (path, metadata) in &entries.files {
            let key = NormalizedPath::relative_to(root, path)?;
            files.records.insert(key, FileRecord::from_metadata(path, metadata));
        }

        tracing::debug!(
            root = %root.display(),
            directories = directories.len(),
            files = files.len(),
            "indexed tree"
        );

        Ok(Self {
            root: root.to_path_buf(),
            directories,
            files,
        })
    }
}
