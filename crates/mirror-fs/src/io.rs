//! Single-item filesystem operations used to converge a replica tree
//!
//! Every function here touches exactly one path (or one tree walk) and maps
//! failures into [`Error::Io`] carrying the offending path.

use std::fs::{self, File, FileTimes, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Whether this platform lets us write a file's creation time back.
pub const CREATION_TIME_SETTABLE: bool = cfg!(any(windows, target_os = "macos"));

/// Entries found beneath a root, excluding the root itself.
#[derive(Debug, Default)]
pub struct TreeEntries {
    pub directories: Vec<PathBuf>,
    pub files: Vec<(PathBuf, Metadata)>,
}

/// Recursively enumerate all directories and files under `root`.
///
/// Symbolic links are followed, so a link to a directory is walked like a
/// directory and a link to a file is reported with its target's metadata.
/// A dangling link is reported as a file with the link's own metadata;
/// copying it then fails for that one item.
///
/// # Errors
///
/// Fails if `root` is not a directory, or on the first entry that cannot be
/// read (including symlink loops).
pub fn walk_tree(root: &Path) -> Result<TreeEntries> {
    ensure_directory(root)?;

    let mut entries = TreeEntries::default();
    for entry in WalkDir::new(root).min_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => match dangling_link(&e) {
                Some((path, metadata)) => {
                    tracing::warn!(path = %path.display(), "symbolic link target does not exist");
                    entries.files.push((path, metadata));
                    continue;
                }
                None => return Err(e.into()),
            },
        };
        if entry.file_type().is_dir() {
            entries.directories.push(entry.into_path());
        } else {
            let metadata = entry.metadata()?;
            entries.files.push((entry.into_path(), metadata));
        }
    }
    Ok(entries)
}

fn dangling_link(error: &walkdir::Error) -> Option<(PathBuf, Metadata)> {
    if error.loop_ancestor().is_some() || error.io_error()?.kind() != io::ErrorKind::NotFound {
        return None;
    }
    let path = error.path()?;
    let metadata = fs::symlink_metadata(path).ok()?;
    metadata
        .file_type()
        .is_symlink()
        .then(|| (path.to_path_buf(), metadata))
}

/// Fail unless `path` exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(Error::NotADirectory {
            path: path.to_path_buf(),
        })
    }
}

/// Create a directory and any missing parents. Succeeds if it already exists.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Remove an empty directory.
///
/// Non-recursive: a directory that still has entries is an error, never
/// silently emptied.
pub fn remove_dir(path: &Path) -> Result<()> {
    fs::remove_dir(path).map_err(|e| Error::io(path, e))
}

/// Remove a file if it is still present.
///
/// Returns `Ok(false)` without touching the filesystem when the path is
/// already gone.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => {
            fs::remove_file(path).map_err(|e| Error::io(path, e))?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Copy `source` to a destination that must not exist yet.
///
/// The destination's modification time is set to the source's.
pub fn copy_new(source: &Path, destination: &Path) -> Result<u64> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    copy_with(source, destination, &options)
}

/// Copy `source` over `destination`, replacing its contents.
///
/// The destination's modification time is set to the source's.
pub fn copy_overwrite(source: &Path, destination: &Path) -> Result<u64> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    copy_with(source, destination, &options)
}

fn copy_with(source: &Path, destination: &Path, options: &OpenOptions) -> Result<u64> {
    // Source first, so an unreadable source never leaves an empty destination behind
    let mut input = File::open(source).map_err(|e| Error::io(source, e))?;
    let source_meta = input.metadata().map_err(|e| Error::io(source, e))?;
    let mut output = options.open(destination).map_err(|e| Error::io(destination, e))?;

    let copied = io::copy(&mut input, &mut output).map_err(|e| Error::io(destination, e))?;
    output.sync_all().map_err(|e| Error::io(destination, e))?;
    drop(output);

    let modified = FileTime::from_last_modification_time(&source_meta);
    filetime::set_file_mtime(destination, modified).map_err(|e| Error::io(destination, e))?;

    tracing::trace!(
        source = %source.display(),
        destination = %destination.display(),
        bytes = copied,
        "copied file"
    );
    Ok(copied)
}

/// Set a file's creation time.
///
/// Returns `Ok(false)` on platforms without a settable creation time; the
/// file is left untouched there.
pub fn set_created(path: &Path, created: SystemTime) -> Result<bool> {
    if !CREATION_TIME_SETTABLE {
        return Ok(false);
    }

    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.set_times(with_created(FileTimes::new(), created))
        .map_err(|e| Error::io(path, e))?;
    Ok(true)
}

#[cfg(windows)]
fn with_created(times: FileTimes, created: SystemTime) -> FileTimes {
    use std::os::windows::fs::FileTimesExt;
    times.set_created(created)
}

#[cfg(target_os = "macos")]
fn with_created(times: FileTimes, created: SystemTime) -> FileTimes {
    use std::os::macos::fs::FileTimesExt;
    times.set_created(created)
}

#[cfg(not(any(windows, target_os = "macos")))]
fn with_created(times: FileTimes, _created: SystemTime) -> FileTimes {
    times
}
