//! Line-number lookup for provider comments

use std::collections::HashMap;

use super::model::Comment;

/// Maps a source line to the trimmed comment attached to it.
///
/// Comments are expected one per line. When several share a line the one
/// that comes last in input order is kept.
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    by_line: HashMap<u32, String>,
}

impl CommentIndex {
    /// Build the index from a flat comment list
    pub fn build(comments: &[Comment]) -> Self {
        let by_line = comments
            .iter()
            .map(|c| (c.line, c.text.trim().to_string()))
            .collect();
        Self { by_line }
    }

    /// Comment text for a line, or `""` when there is none
    pub fn get(&self, line: u32) -> &str {
        self.by_line.get(&line).map_or("", String::as_str)
    }

    /// Whether a non-empty comment is attached to the line
    pub fn has_comment(&self, line: u32) -> bool {
        !self.get(line).is_empty()
    }

    /// Number of lines with a comment
    pub fn len(&self) -> usize {
        self.by_line.len()
    }

    /// Whether no comments were indexed
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}
