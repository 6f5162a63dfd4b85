//! Transitive "depends on a changed package" computation

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::types::Package;

use super::graph::DependencyGraph;

/// Memo state for one `(package, target)` pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mark {
    /// Not evaluated yet
    #[default]
    Unmarked,
    /// Evaluation started and has not proved a path
    Visiting,
    /// A dependency path to the target exists
    Dependent,
}

/// Pairwise memo for one closure run
///
/// `Dependent` marks are never downgraded. `Visiting` marks stay in place
/// after a search fails, so a pair reached again through a cycle while it
/// is still being explored answers "not dependent".
#[derive(Debug, Default)]
pub struct ClosureCache<'a> {
    marks: HashMap<(&'a str, &'a str), Mark>,
}

impl<'a> ClosureCache<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mark for a pair
    pub fn get(&self, package: &'a str, target: &'a str) -> Mark {
        self.marks
            .get(&(package, target))
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, package: &'a str, target: &'a str, mark: Mark) {
        let entry = self.marks.entry((package, target)).or_default();
        if *entry != Mark::Dependent {
            *entry = mark;
        }
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// A package pulled in by one of its dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent<'a> {
    pub package: &'a Package,
    /// The changed or prereleased package it reaches
    pub via: &'a str,
}

/// Reachability over direct-dependency edges, memoized per run
pub struct DependencyClosure<'a> {
    graph: &'a DependencyGraph,
    cache: ClosureCache<'a>,
}

impl<'a> DependencyClosure<'a> {
    /// Start a run with an empty cache
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            cache: ClosureCache::new(),
        }
    }

    /// Whether `package` reaches `target` through one or more dependency edges
    pub fn is_dependent_of(&mut self, package: &'a str, target: &'a str) -> bool {
        match self.cache.get(package, target) {
            Mark::Dependent => return true,
            Mark::Visiting => return false,
            Mark::Unmarked => {}
        }

        let graph = self.graph;
        let dependencies = graph.dependencies(package);

        if dependencies.iter().any(|dep| dep == target) {
            self.cache.set(package, target, Mark::Dependent);
            return true;
        }

        // Mark before descending so cycles terminate.
        self.cache.set(package, target, Mark::Visiting);

        let mut found = false;
        // Every branch is explored so the cache fills in fully.
        for dep in dependencies {
            if self.is_dependent_of(dep, target) {
                self.cache.set(package, target, Mark::Dependent);
                found = true;
            }
        }
        found
    }

    /// Every package that depends on at least one of `targets`
    ///
    /// Targets are checked in order and the first hit wins for each package.
    pub fn collect(
        &mut self,
        packages: &'a [Package],
        targets: &[&'a str],
    ) -> BTreeMap<&'a str, Dependent<'a>> {
        let mut dependents = BTreeMap::new();
        if targets.is_empty() {
            return dependents;
        }

        for pkg in packages {
            for &target in targets {
                if self.is_dependent_of(&pkg.name, target) {
                    debug!(package = %pkg.name, via = target, "dependent on changed package");
                    dependents.insert(
                        pkg.name.as_str(),
                        Dependent {
                            package: pkg,
                            via: target,
                        },
                    );
                    break;
                }
            }
        }

        debug!(
            dependents = dependents.len(),
            cached_pairs = self.cache.len(),
            "dependency closure complete"
        );
        dependents
    }

    pub fn cache(&self) -> &ClosureCache<'a> {
        &self.cache
    }
}
