//! Normalized relative paths used as identity keys across both trees

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Relative paths are the identity of an entry across the source and replica
/// trees, so two paths naming the same location must compare equal no matter
/// which separator or redundant `.` segments produced them. Conversion back to
/// a platform-native path only happens at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Splits on the platform's separators, drops empty and `.` segments and
    /// rejoins with `/`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut inner = String::new();
        for component in path.as_ref().components() {
            match component {
                Component::Prefix(prefix) => {
                    inner.push_str(&prefix.as_os_str().to_string_lossy().replace('\\', "/"));
                }
                Component::RootDir => inner.push('/'),
                Component::CurDir => {}
                Component::ParentDir => push_segment(&mut inner, ".."),
                Component::Normal(segment) => push_segment(&mut inner, &segment.to_string_lossy()),
            }
        }
        Self { inner }
    }

    /// Express `path` relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutsideRoot`] if `path` does not start with `root`.
    pub fn relative_to(root: &Path, path: &Path) -> Result<Self> {
        path.strip_prefix(root)
            .map(Self::new)
            .map_err(|_| Error::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether this is the empty path (the root itself).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        let mut native = PathBuf::new();
        if self.inner.starts_with('/') {
            native.push("/");
        }
        for segment in self.segments() {
            native.push(segment);
        }
        native
    }

    /// Resolve this relative path against a root directory.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_native())
    }

    /// Number of non-empty segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }
}

fn push_segment(inner: &mut String, segment: &str) {
    if !inner.is_empty() && !inner.ends_with('/') {
        inner.push('/');
    }
    inner.push_str(segment);
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
