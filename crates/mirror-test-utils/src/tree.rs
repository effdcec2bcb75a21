//! [`TestTree`] builder for source/replica test scenarios.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use tempfile::TempDir;

/// A temporary directory holding a `source/` and a `replica/` root, with
/// helpers for populating them and asserting on the result.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write_source("docs/readme.md", "# Hello");
/// tree.write_replica("stale.txt", "old");
/// // ... run a cycle ...
/// tree.assert_converged();
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create empty `source/` and `replica/` roots.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("source")).unwrap();
        fs::create_dir(temp_dir.path().join("replica")).unwrap();
        Self { temp_dir }
    }

    /// The directory containing both roots.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.base().join("source")
    }

    pub fn replica(&self) -> PathBuf {
        self.base().join("replica")
    }

    /// Write a file under the source root, creating parent directories.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.source(), rel, content)
    }

    /// Write a file under the replica root, creating parent directories.
    pub fn write_replica(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.replica(), rel, content)
    }

    pub fn mkdir_source(&self, rel: &str) -> PathBuf {
        make_dir(&self.source(), rel)
    }

    pub fn mkdir_replica(&self, rel: &str) -> PathBuf {
        make_dir(&self.replica(), rel)
    }

    /// Set a source file's modification time.
    pub fn set_source_mtime(&self, rel: &str, time: SystemTime) {
        filetime::set_file_mtime(self.source().join(rel), FileTime::from_system_time(time))
            .unwrap_or_else(|e| panic!("set_source_mtime: {rel}: {e}"));
    }

    /// Set a replica file's modification time.
    pub fn set_replica_mtime(&self, rel: &str, time: SystemTime) {
        filetime::set_file_mtime(self.replica().join(rel), FileTime::from_system_time(time))
            .unwrap_or_else(|e| panic!("set_replica_mtime: {rel}: {e}"));
    }

    /// Relative paths (with `/` separators) of every file under `root`.
    pub fn files_under(root: &Path) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        collect(root, root, &mut out, false);
        out
    }

    /// Relative paths (with `/` separators) of every directory under `root`.
    pub fn dirs_under(root: &Path) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        collect(root, root, &mut out, true);
        out
    }

    /// Read a replica file's content.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_replica(&self, rel: &str) -> String {
        let path = self.replica().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read replica file {}: {e}", path.display()))
    }

    /// Assert that the replica has a file at `rel` with exactly `content`.
    pub fn assert_replica_file(&self, rel: &str, content: &str) {
        assert_eq!(
            self.read_replica(rel),
            content,
            "Replica file {rel} has unexpected content"
        );
    }

    /// Assert that nothing exists at `rel` under the replica.
    pub fn assert_replica_missing(&self, rel: &str) {
        let path = self.replica().join(rel);
        assert!(
            !path.exists(),
            "Expected replica path NOT to exist: {}",
            path.display()
        );
    }

    /// Assert that the replica has exactly the source's directories and
    /// files, and every file has identical content and modification time.
    pub fn assert_converged(&self) {
        let source = self.source();
        let replica = self.replica();

        assert_eq!(
            Self::dirs_under(&source),
            Self::dirs_under(&replica),
            "Directory sets differ"
        );

        let files = Self::files_under(&source);
        assert_eq!(files, Self::files_under(&replica), "File sets differ");

        for rel in &files {
            let src = source.join(rel);
            let dst = replica.join(rel);
            assert_eq!(
                fs::read(&src).unwrap(),
                fs::read(&dst).unwrap(),
                "Content differs for {rel}"
            );
            assert_eq!(
                fs::metadata(&src).unwrap().modified().unwrap(),
                fs::metadata(&dst).unwrap().modified().unwrap(),
                "Modification time differs for {rel}"
            );
        }
    }
}

fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap_or_else(|e| panic!("write_file: {}: {e}", path.display()));
    path
}

fn make_dir(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(&path).unwrap_or_else(|e| panic!("make_dir: {}: {e}", path.display()));
    path
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeSet<String>, dirs: bool) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_dir() {
            if dirs {
                out.insert(rel);
            }
            collect(root, &path, out, dirs);
        } else if !dirs {
            out.insert(rel);
        }
    }
}
