//! Types for the raw input handed over by a parse-tree provider and for the
//! classified documentation forest.

use serde::{Deserialize, Serialize};

/// A line-anchored comment reported by the parse-tree provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Source line the comment documents
    pub line: u32,
    /// Comment text, untrimmed
    pub text: String,
}

impl Comment {
    /// Create a new comment
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// An unclassified node of a parse tree.
///
/// Every field is optional because upstream data may be incomplete; the
/// classifier decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNode {
    /// Declared name
    pub name: Option<String>,
    /// Source line
    pub line: Option<u32>,
    /// Column or offset within the line
    pub pos: Option<u32>,
    /// Base type, supertype or declared type as reported upstream
    pub base: Option<String>,
    /// Structural children in source order
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Create a node with a name and a line
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: Some(name.into()),
            line: Some(line),
            ..Self::default()
        }
    }

    /// Set the position
    pub fn with_pos(mut self, pos: u32) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Set the base
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    pub fn with_children(mut self, children: impl IntoIterator<Item = RawNode>) -> Self {
        self.children.extend(children);
        self
    }
}

/// One source unit as produced by the parse-tree provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Grouping key supplied by the provider (usually a package name)
    #[serde(default)]
    pub package: String,
    /// Comments of the unit
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Root-level nodes of the unit
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

impl SourceUnit {
    /// Create a new source unit
    pub fn new(package: impl Into<String>, comments: Vec<Comment>, nodes: Vec<RawNode>) -> Self {
        Self {
            package: package.into(),
            comments,
            nodes,
        }
    }
}

/// A leaf documentation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    /// Declared name
    pub name: String,
    /// Source line
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<u32>,
    /// Trimmed comment text, empty when the line has none
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Whether the name contains a `?`
    pub is_question: bool,
}

impl ObjectEntry {
    /// Create a leaf entry; `is_question` is derived from the name
    pub fn new(
        name: impl Into<String>,
        line: u32,
        pos: Option<u32>,
        base: Option<String>,
        comment: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            is_question: name.contains('?'),
            name,
            line,
            pos,
            comment: comment.into(),
            base,
        }
    }
}

/// A documentation container owning nested Abstracts and leaf Objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Abstract {
    /// Declared name
    pub name: String,
    /// Underscore-joined path from the root Abstract
    pub unique_id: String,
    /// Source line
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<u32>,
    /// Trimmed comment text, empty when the line has none
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Whether the name contains a `?`
    pub is_question: bool,
    /// `unique_id` of the enclosing Abstract. Only a lookup key, never owned.
    #[serde(skip)]
    pub parent: Option<String>,
    /// Nested Abstracts in source order
    pub abstracts: Vec<Abstract>,
    /// Leaf entries in source order, unique by name
    pub objects: Vec<ObjectEntry>,
}

impl Abstract {
    /// Promote a leaf entry to a container.
    ///
    /// The identity is the entry name for a root, or the parent's identity
    /// joined to the name with `_` when a parent is given.
    pub fn from_entry(entry: ObjectEntry, parent: Option<&Abstract>) -> Self {
        let unique_id = match parent {
            Some(parent) => parent.child_id(&entry.name),
            None => entry.name.clone(),
        };
        Self {
            name: entry.name,
            unique_id,
            line: entry.line,
            pos: entry.pos,
            comment: entry.comment,
            base: entry.base,
            is_question: entry.is_question,
            parent: parent.map(|p| p.unique_id.clone()),
            abstracts: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Identity a nested Abstract named `name` would get under this one
    pub fn child_id(&self, name: &str) -> String {
        format!("{}_{}", self.unique_id, name)
    }

    /// Attach a classified entry to the matching list.
    ///
    /// Objects are unique by name within one Abstract: a second object with
    /// an existing name is rejected and `false` is returned.
    pub fn attach(&mut self, entry: Entry) -> bool {
        match entry {
            Entry::Abstract(child) => {
                self.abstracts.push(child);
                true
            }
            Entry::Object(object) => {
                if self.has_object(&object.name) {
                    return false;
                }
                self.objects.push(object);
                true
            }
        }
    }

    /// Whether a leaf entry with this name is attached
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o.name == name)
    }

    /// Whether a nested Abstract with this identity is attached
    pub fn has_abstract(&self, unique_id: &str) -> bool {
        self.abstracts.iter().any(|a| a.unique_id == unique_id)
    }

    /// Find a direct nested Abstract by name
    pub fn abstract_named(&self, name: &str) -> Option<&Abstract> {
        self.abstracts.iter().find(|a| a.name == name)
    }

    /// Find a leaf entry by name
    pub fn object_named(&self, name: &str) -> Option<&ObjectEntry> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Visit this Abstract and every nested one, depth first, parents first
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Abstract)) {
        f(self);
        for child in &self.abstracts {
            child.visit(f);
        }
    }

    /// Number of Abstracts in this subtree, including this one
    pub fn abstract_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    /// Number of leaf entries in this subtree
    pub fn object_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |a| count += a.objects.len());
        count
    }
}

/// A classified node: decided once, never re-derived from shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Abstract(Abstract),
    Object(ObjectEntry),
}
