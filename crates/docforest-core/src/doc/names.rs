//! Placeholder names that never reach the documentation model

/// Names the provider emits for anonymous constructs
pub const RESERVED_NAMES: [&str; 3] = ["Unnamed", "@", "λ"];

/// Whether a node with this name is hidden, together with its subtree.
///
/// Absent and empty names count as reserved.
pub fn is_reserved(name: Option<&str>) -> bool {
    match name {
        None => true,
        Some(name) => name.is_empty() || RESERVED_NAMES.contains(&name),
    }
}
