//! Docforest Core - classification engine for documentation forests
//!
//! This crate provides the I/O-free core:
//! - Model: raw parse-tree nodes, comments and the classified forest
//! - Classifier: Abstract / Object decisions and identity assignment
//! - Project: run-scoped deduplication and grouping by package

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Documentation classification module
pub mod doc;

/// Convenience re-export of the run entry point
pub use doc::{ClassifyOptions, DocRun, ProjectDoc};
