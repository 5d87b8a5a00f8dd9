//! Project-wide classification runs
//!
//! A [`DocRun`] owns the identity registry of one generation run and
//! classifies any number of source units with it. Results are grouped by the
//! package key each unit carries into a [`ProjectDoc`], and an
//! [`AbstractIndex`] resolves identities and breadcrumbs over the result.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info};

use super::classifier::{ClassifyOptions, ClassifyStats, Classifier, DropReason};
use super::comments::CommentIndex;
use super::model::{Abstract, SourceUnit};
use super::registry::IdentityRegistry;

/// Classified forests of one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDoc {
    /// Grouping key
    pub name: String,
    /// Root Abstracts of every unit in the package, in input order
    pub abstracts: Vec<Abstract>,
}

/// Classified output of a run, grouped by package in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDoc {
    packages: Vec<PackageDoc>,
    by_name: HashMap<String, usize>,
}

impl ProjectDoc {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the roots of one unit to its package
    pub fn add_unit(&mut self, package: &str, roots: Vec<Abstract>) {
        let idx = match self.by_name.get(package) {
            Some(&idx) => idx,
            None => {
                self.packages.push(PackageDoc {
                    name: package.to_string(),
                    abstracts: Vec::new(),
                });
                self.by_name.insert(package.to_string(), self.packages.len() - 1);
                self.packages.len() - 1
            }
        };
        self.packages[idx].abstracts.extend(roots);
    }

    /// Packages in first-seen order
    pub fn packages(&self) -> &[PackageDoc] {
        &self.packages
    }

    /// Root Abstracts of a package
    pub fn package(&self, name: &str) -> Option<&[Abstract]> {
        self.by_name
            .get(name)
            .map(|&idx| self.packages[idx].abstracts.as_slice())
    }

    /// Every root Abstract across packages
    pub fn roots(&self) -> impl Iterator<Item = &Abstract> {
        self.packages.iter().flat_map(|p| p.abstracts.iter())
    }

    /// Number of root Abstracts
    pub fn root_count(&self) -> usize {
        self.packages.iter().map(|p| p.abstracts.len()).sum()
    }

    /// Number of Abstracts at any depth
    pub fn abstract_count(&self) -> usize {
        self.roots().map(Abstract::abstract_count).sum()
    }

    /// Number of leaf entries at any depth
    pub fn object_count(&self) -> usize {
        self.roots().map(Abstract::object_count).sum()
    }

    /// Build an identity index over the whole project
    pub fn index(&self) -> AbstractIndex<'_> {
        AbstractIndex::new(self.roots())
    }

    /// Whether no package was added
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Serialize for ProjectDoc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.packages.len()))?;
        for package in &self.packages {
            map.serialize_entry(&package.name, &package.abstracts)?;
        }
        map.end()
    }
}

/// Identity lookup over a classified forest.
///
/// Nested identities are not deduplicated; when two nested Abstracts share
/// one, the first in depth-first order is indexed.
#[derive(Debug, Default)]
pub struct AbstractIndex<'p> {
    by_id: HashMap<&'p str, &'p Abstract>,
}

impl<'p> AbstractIndex<'p> {
    /// Index every Abstract reachable from `roots`
    pub fn new(roots: impl IntoIterator<Item = &'p Abstract>) -> Self {
        let mut by_id = HashMap::new();
        for root in roots {
            root.visit(&mut |a: &'p Abstract| {
                by_id.entry(a.unique_id.as_str()).or_insert(a);
            });
        }
        Self { by_id }
    }

    /// Find an Abstract by identity
    pub fn get(&self, unique_id: &str) -> Option<&'p Abstract> {
        self.by_id.get(unique_id).copied()
    }

    /// Enclosing Abstract, following the back-link
    pub fn parent_of(&self, item: &Abstract) -> Option<&'p Abstract> {
        item.parent.as_deref().and_then(|id| self.get(id))
    }

    /// Ancestors of an Abstract, root first, ending with the Abstract itself
    pub fn breadcrumbs(&self, unique_id: &str) -> Vec<&'p Abstract> {
        let mut trail = Vec::new();
        let mut current = self.get(unique_id);
        while let Some(item) = current {
            trail.push(item);
            current = self.parent_of(item);
        }
        trail.reverse();
        trail
    }

    /// Number of indexed identities
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One generation run.
///
/// Root identities are deduplicated across every unit classified by the
/// same run. Start a new `DocRun` for an independent invocation.
#[derive(Debug, Default)]
pub struct DocRun {
    options: ClassifyOptions,
    registry: IdentityRegistry,
    stats: ClassifyStats,
}

impl DocRun {
    /// Create a run with a fresh registry
    pub fn new(options: ClassifyOptions) -> Self {
        Self {
            options,
            registry: IdentityRegistry::new(),
            stats: ClassifyStats::default(),
        }
    }

    /// Counters accumulated over every unit classified so far
    pub fn stats(&self) -> &ClassifyStats {
        &self.stats
    }

    /// Root identities emitted so far
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Classify the nodes of a single unit
    pub fn classify_unit(&mut self, unit: &SourceUnit) -> Vec<Abstract> {
        let comments = CommentIndex::build(&unit.comments);
        let mut classifier = Classifier::new(&comments, self.options);
        let roots = classifier.classify_roots(&unit.nodes, &self.registry);
        self.stats.merge(classifier.stats());
        roots
    }

    /// Classify units one after another and group them by package
    pub fn run(&mut self, units: &[SourceUnit]) -> ProjectDoc {
        let mut project = ProjectDoc::new();
        for unit in units {
            let roots = self.classify_unit(unit);
            project.add_unit(&unit.package, roots);
        }
        self.log_summary(units.len(), &project);
        project
    }

    /// Classify units on the rayon pool.
    ///
    /// Units are classified independently; root identities are then claimed
    /// by this thread alone in input order, so the output matches [`run`].
    ///
    /// [`run`]: DocRun::run
    pub fn run_parallel(&mut self, units: &[SourceUnit]) -> ProjectDoc {
        let options = self.options;
        let classified: Vec<(Vec<Abstract>, ClassifyStats)> = units
            .par_iter()
            .map(|unit| {
                let comments = CommentIndex::build(&unit.comments);
                let mut classifier = Classifier::new(&comments, options);
                let roots = classifier.build_roots(&unit.nodes);
                (roots, classifier.into_stats())
            })
            .collect();

        let mut project = ProjectDoc::new();
        for (unit, (roots, stats)) in units.iter().zip(classified) {
            self.stats.merge(&stats);
            let mut kept = Vec::with_capacity(roots.len());
            for root in roots {
                if self.registry.claim(&root.unique_id) {
                    kept.push(root);
                } else {
                    debug!(
                        "dropping {:?} at line {}: {}",
                        root.name,
                        root.line,
                        DropReason::DuplicateRoot
                    );
                    self.stats.record(DropReason::DuplicateRoot);
                }
            }
            project.add_unit(&unit.package, kept);
        }
        self.log_summary(units.len(), &project);
        project
    }

    fn log_summary(&self, units: usize, project: &ProjectDoc) {
        info!(
            "classified {} units into {} packages: {} roots, {} abstracts, {} objects, {} dropped",
            units,
            project.packages().len(),
            project.root_count(),
            project.abstract_count(),
            project.object_count(),
            self.stats.total_dropped()
        );
    }
}
