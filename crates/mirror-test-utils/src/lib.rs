//! Shared test utilities for the folder-mirror workspace.
//!
//! This crate provides standardised source/replica fixtures so crate test
//! suites do not each reinvent temporary-tree setup. It is a dev-dependency
//! only and is never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for a source/replica pair

pub mod tree;

pub use tree::TestTree;
