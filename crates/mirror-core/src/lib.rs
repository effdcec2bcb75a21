//! Synchronization engine for folder-mirror
//!
//! This crate turns a replica directory into a content-identical copy of a
//! source directory, one cycle at a time:
//!
//! - **fingerprint**: decide whether a replica file is still up to date
//! - **compare**: walk both trees and classify every path into a [`DiffResult`]
//! - **apply**: converge the replica by applying a diff item by item
//! - **scheduler**: repeat compare→apply on an interval, interruptible by
//!   "sync now" and "stop" requests
//!
//! # Architecture
//!
//! ```text
//!            mirror-cli
//!                |
//!           mirror-core
//!   scheduler -> compare -> apply
//!                |
//!            mirror-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{SyncConfig, SyncControl, SyncScheduler};
//!
//! fn example() -> mirror_core::Result<()> {
//!     let config = SyncConfig::new("/data/source", "/data/replica", 30).validate()?;
//!     let control = SyncControl::new();
//!     let mut scheduler = SyncScheduler::from_config(&config, control.clone());
//!     scheduler.run();
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod compare;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod scheduler;
pub mod tree;

pub use apply::{ApplyReport, ItemFailure, Operation, ReplicaMutator};
pub use compare::{DiffResult, TreeComparer};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use fingerprint::{CompareMode, FileComparer, FileRecord};
pub use scheduler::{CycleOutcome, RunSummary, SchedulerState, SyncControl, SyncScheduler, WakeReason};
pub use tree::{DirectoryTree, FileIndex, TreeSnapshot};
