//! Run-scoped registry of root identities

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Root identities already emitted during one run.
///
/// A fresh registry belongs to every run and is dropped with it. It is safe
/// to share across threads; [`IdentityRegistry::claim`] performs the check
/// and the mark under one lock.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    seen: Mutex<HashSet<String>>,
}

impl IdentityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identity was already marked
    pub fn has_seen(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// Mark the identity as emitted
    pub fn mark_seen(&self, id: &str) {
        self.lock().insert(id.to_string());
    }

    /// Mark the identity and report whether this call was the first to do so
    pub fn claim(&self, id: &str) -> bool {
        let mut seen = self.lock();
        if seen.contains(id) {
            false
        } else {
            seen.insert(id.to_string())
        }
    }

    /// Number of identities marked so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was marked yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The set stays consistent even if a holder panicked, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
