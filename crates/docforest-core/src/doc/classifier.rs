//! Classifier - walks raw nodes and builds the documentation forest
//!
//! Every usable root node becomes an [`Abstract`]. Below a root, a node is
//! promoted to a nested Abstract when it has significant children, otherwise
//! it becomes a leaf [`ObjectEntry`] and its own children are flattened into
//! the nearest Abstract.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::comments::CommentIndex;
use super::model::{Abstract, Entry, ObjectEntry, RawNode};
use super::names::is_reserved;
use super::registry::IdentityRegistry;

/// Classification switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClassifyOptions {
    /// Omit every node without a non-empty comment, at any depth
    pub skip_uncommented: bool,
}

/// Why a node was left out of the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Absent, empty or placeholder name
    Reserved,
    /// No source line
    MissingLine,
    /// No comment while uncommented nodes are skipped
    Uncommented,
    /// Root identity already emitted earlier in the run
    DuplicateRoot,
    /// Leaf name already present in the enclosing Abstract
    DuplicateObject,
}

impl DropReason {
    /// Short label for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Reserved => "reserved name",
            DropReason::MissingLine => "missing line",
            DropReason::Uncommented => "uncommented",
            DropReason::DuplicateRoot => "duplicate root",
            DropReason::DuplicateObject => "duplicate object",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected while classifying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub reserved: usize,
    pub missing_line: usize,
    pub uncommented: usize,
    pub duplicate_roots: usize,
    pub duplicate_objects: usize,
    /// Root children added by the reconciliation pass
    pub reconciled: usize,
}

impl ClassifyStats {
    /// Count one dropped node
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Reserved => self.reserved += 1,
            DropReason::MissingLine => self.missing_line += 1,
            DropReason::Uncommented => self.uncommented += 1,
            DropReason::DuplicateRoot => self.duplicate_roots += 1,
            DropReason::DuplicateObject => self.duplicate_objects += 1,
        }
    }

    /// Dropped nodes of one kind
    pub fn count(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::Reserved => self.reserved,
            DropReason::MissingLine => self.missing_line,
            DropReason::Uncommented => self.uncommented,
            DropReason::DuplicateRoot => self.duplicate_roots,
            DropReason::DuplicateObject => self.duplicate_objects,
        }
    }

    /// Dropped nodes of every kind
    pub fn total_dropped(&self) -> usize {
        self.reserved
            + self.missing_line
            + self.uncommented
            + self.duplicate_roots
            + self.duplicate_objects
    }

    /// Add another set of counters to this one
    pub fn merge(&mut self, other: &ClassifyStats) {
        self.reserved += other.reserved;
        self.missing_line += other.missing_line;
        self.uncommented += other.uncommented;
        self.duplicate_roots += other.duplicate_roots;
        self.duplicate_objects += other.duplicate_objects;
        self.reconciled += other.reconciled;
    }
}

/// Classifies the raw nodes of one source unit
pub struct Classifier<'a> {
    comments: &'a CommentIndex,
    options: ClassifyOptions,
    stats: ClassifyStats,
}

impl<'a> Classifier<'a> {
    /// Create a classifier reading comments from `comments`
    pub fn new(comments: &'a CommentIndex, options: ClassifyOptions) -> Self {
        Self {
            comments,
            options,
            stats: ClassifyStats::default(),
        }
    }

    /// Counters collected so far
    pub fn stats(&self) -> &ClassifyStats {
        &self.stats
    }

    /// Consume the classifier and return its counters
    pub fn into_stats(self) -> ClassifyStats {
        self.stats
    }

    /// Classify root-level nodes.
    ///
    /// A root whose identity the registry already holds is dropped with its
    /// whole subtree; the first occurrence in the run wins.
    pub fn classify_roots(
        &mut self,
        nodes: &[RawNode],
        registry: &IdentityRegistry,
    ) -> Vec<Abstract> {
        let mut roots = Vec::new();

        for node in nodes {
            let Some(entry) = self.admit(node) else {
                continue;
            };
            if !registry.claim(&entry.name) {
                self.drop_node(node, DropReason::DuplicateRoot);
                continue;
            }
            roots.push(self.build_root(node, entry));
        }

        roots
    }

    /// Classify root-level nodes without consulting a registry.
    ///
    /// Duplicate identities are all kept; the caller deduplicates them.
    pub fn build_roots(&mut self, nodes: &[RawNode]) -> Vec<Abstract> {
        nodes
            .iter()
            .filter_map(|node| {
                let entry = self.admit(node)?;
                Some(self.build_root(node, entry))
            })
            .collect()
    }

    /// Classify nodes below `parent`.
    ///
    /// Significant nodes become nested Abstracts. The rest become leaves of
    /// `parent`, and their children are classified against `parent` as well.
    pub fn classify_nested(&mut self, nodes: &[RawNode], parent: &mut Abstract) {
        for node in nodes {
            let Some(entry) = self.admit(node) else {
                continue;
            };

            if self.is_significant(node) {
                let mut nested = Abstract::from_entry(entry, Some(&*parent));
                self.classify_nested(&node.children, &mut nested);
                parent.attach(Entry::Abstract(nested));
                continue;
            }

            if !parent.attach(Entry::Object(entry)) {
                self.drop_node(node, DropReason::DuplicateObject);
                continue;
            }
            if !node.children.is_empty() {
                self.classify_nested(&node.children, parent);
            }
        }
    }

    fn build_root(&mut self, node: &RawNode, entry: ObjectEntry) -> Abstract {
        let mut root = Abstract::from_entry(entry, None);

        for child in &node.children {
            let Some(entry) = self.admit(child) else {
                continue;
            };
            if self.has_qualifying_children(child) {
                let mut nested = Abstract::from_entry(entry, Some(&root));
                self.classify_nested(&child.children, &mut nested);
                root.attach(Entry::Abstract(nested));
            } else if !root.attach(Entry::Object(entry)) {
                self.drop_node(child, DropReason::DuplicateObject);
            }
        }

        self.reconcile(node, &mut root);
        root
    }

    /// Add every qualifying direct child that neither list represents yet
    fn reconcile(&mut self, node: &RawNode, root: &mut Abstract) {
        for child in &node.children {
            let Ok((name, line, comment)) = self.screen(child) else {
                continue;
            };
            if root.has_object(name) || root.has_abstract(&root.child_id(name)) {
                continue;
            }
            trace!("reconciling {} (line {}) into {}", name, line, root.unique_id);
            let entry = ObjectEntry::new(name, line, child.pos, child.base.clone(), comment);
            root.attach(Entry::Object(entry));
            self.stats.reconciled += 1;
        }
    }

    /// Screen a node and build its leaf entry, counting it when dropped
    fn admit(&mut self, node: &RawNode) -> Option<ObjectEntry> {
        match self.screen(node) {
            Ok((name, line, comment)) => Some(ObjectEntry::new(
                name,
                line,
                node.pos,
                node.base.clone(),
                comment,
            )),
            Err(reason) => {
                self.drop_node(node, reason);
                None
            }
        }
    }

    /// Name, line and comment of a usable node
    fn screen<'n>(&self, node: &'n RawNode) -> Result<(&'n str, u32, &'a str), DropReason> {
        let name = node.name.as_deref();
        if is_reserved(name) {
            return Err(DropReason::Reserved);
        }
        let name = name.unwrap_or_default();
        let line = node.line.ok_or(DropReason::MissingLine)?;
        let comment = self.comments.get(line);
        if self.options.skip_uncommented && !self.comments.has_comment(line) {
            return Err(DropReason::Uncommented);
        }
        Ok((name, line, comment))
    }

    fn qualifies(&self, node: &RawNode) -> bool {
        self.screen(node).is_ok()
    }

    /// Root pass test: at least one child that passes the filters
    fn has_qualifying_children(&self, node: &RawNode) -> bool {
        node.children.iter().any(|c| self.qualifies(c))
    }

    /// Nested pass test: at least one qualifying child that has children of
    /// its own, whether or not those pass the filters
    fn is_significant(&self, node: &RawNode) -> bool {
        node.children
            .iter()
            .any(|c| self.qualifies(c) && !c.children.is_empty())
    }

    fn drop_node(&mut self, node: &RawNode, reason: DropReason) {
        debug!(
            "dropping {:?} at line {:?}: {}",
            node.name.as_deref().unwrap_or(""),
            node.line,
            reason
        );
        self.stats.record(reason);
    }
}
