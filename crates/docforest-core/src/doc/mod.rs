//! Documentation model for raw parse-tree fragments
//!
//! This module classifies generic parse-tree nodes into a forest of
//! Abstracts (containers) and Objects (leaf entries), deduplicating root
//! identities across every source unit of a run.

mod classifier;
mod comments;
mod model;
mod names;
mod project;
mod registry;

pub use classifier::{ClassifyOptions, ClassifyStats, Classifier, DropReason};
pub use comments::CommentIndex;
pub use model::{Abstract, Comment, Entry, ObjectEntry, RawNode, SourceUnit};
pub use names::{is_reserved, RESERVED_NAMES};
pub use project::{AbstractIndex, DocRun, PackageDoc, ProjectDoc};
pub use registry::IdentityRegistry;
