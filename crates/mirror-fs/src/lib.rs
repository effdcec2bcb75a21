//! Filesystem primitives for folder-mirror
//!
//! Provides separator-normalized relative path keys, content digests and the
//! individual create/copy/remove operations the mirroring engine is built from.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{Digest128, compute_file_digest};
pub use error::{Error, Result};
pub use path::NormalizedPath;
