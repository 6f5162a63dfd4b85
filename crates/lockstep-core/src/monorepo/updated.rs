//! Collecting the packages that need a new version

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::types::{Package, Update, UpdateReason};

use super::changes::{ChangeDetector, IgnoreFilter};
use super::closure::{Dependent, DependencyClosure};
use super::forced::ForcedSet;
use super::graph::DependencyGraph;
use super::history::History;
use super::options::UpdateOptions;
use super::prerelease::detect_prereleased;
use super::since::select_since;
use super::PackageMap;

/// Intermediate result sets of one run, keyed by package name
#[derive(Debug, Default)]
pub struct ResultSets<'a> {
    /// Packages with a qualifying change
    pub updated: PackageMap<'a>,
    /// Packages already on a prerelease version
    pub prereleased: PackageMap<'a>,
    /// Packages depending on an updated or prereleased package
    pub dependent: BTreeMap<&'a str, Dependent<'a>>,
}

impl<'a> ResultSets<'a> {
    /// Closure targets: updated names in package order, then prereleased-only names
    pub fn targets(&self, packages: &'a [Package]) -> Vec<&'a str> {
        let updated = packages
            .iter()
            .filter(|p| self.updated.contains_key(p.name.as_str()));
        let prereleased = packages.iter().filter(|p| {
            self.prereleased.contains_key(p.name.as_str())
                && !self.updated.contains_key(p.name.as_str())
        });
        updated
            .chain(prereleased)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct UpdatedPackages<'a> {
    /// The comparison point that was used, if any
    pub since: Option<String>,
    /// Normalized force-publish set
    pub forced: ForcedSet,
    /// Intermediate result sets
    pub sets: ResultSets<'a>,
    /// Packages to bump, in input order
    pub updates: Vec<Update<'a>>,
}

/// Drives one changed-package computation over a fixed package set and graph
pub struct UpdatedPackagesCollector<'a, H: History> {
    history: &'a H,
    root: PathBuf,
    packages: &'a [Package],
    graph: &'a DependencyGraph,
}

impl<'a, H: History> UpdatedPackagesCollector<'a, H> {
    /// `root` is the repository root the history reports paths against
    pub fn new(
        history: &'a H,
        root: impl Into<PathBuf>,
        packages: &'a [Package],
        graph: &'a DependencyGraph,
    ) -> Self {
        Self {
            history,
            root: root.into(),
            packages,
            graph,
        }
    }

    /// Run every stage and return the updates with their intermediate sets
    pub fn collect(&self, options: &UpdateOptions) -> Result<UpdatedPackages<'a>> {
        info!(packages = self.packages.len(), "checking for updated packages");

        let forced = ForcedSet::resolve(options.force_publish.as_ref());
        let ignore = IgnoreFilter::new(&options.ignore)?;
        let since = select_since(self.history, options.since.as_deref(), options.canary)?;

        let updated = ChangeDetector::new(self.history, self.root.clone())
            .with_ignore(ignore)
            .detect(self.packages, since.as_deref(), &forced)?;
        let prereleased = detect_prereleased(self.packages, options.cd_version.as_deref());

        let mut sets = ResultSets {
            updated,
            prereleased,
            dependent: BTreeMap::new(),
        };
        let targets = sets.targets(self.packages);
        sets.dependent = DependencyClosure::new(self.graph).collect(self.packages, &targets);

        let updates = aggregate(self.packages, &sets, &forced, options.canary);
        info!(
            updated = sets.updated.len(),
            prereleased = sets.prereleased.len(),
            dependent = sets.dependent.len(),
            total = updates.len(),
            "collected updated packages"
        );

        Ok(UpdatedPackages {
            since,
            forced,
            sets,
            updates,
        })
    }
}

/// Union the result sets into updates, keeping input order
pub fn aggregate<'a>(
    packages: &'a [Package],
    sets: &ResultSets<'a>,
    forced: &ForcedSet,
    canary: bool,
) -> Vec<Update<'a>> {
    packages
        .iter()
        .filter_map(|pkg| {
            let name = pkg.name.as_str();
            let reason = if sets.updated.contains_key(name) {
                if forced.forces(name) {
                    UpdateReason::Forced
                } else {
                    UpdateReason::Changed
                }
            } else if sets.prereleased.contains_key(name) {
                UpdateReason::Prerelease
            } else if let Some(dependent) = sets.dependent.get(name) {
                UpdateReason::DependencyChanged(dependent.via.to_string())
            } else if canary {
                UpdateReason::Canary
            } else {
                return None;
            };
            Some(Update::new(pkg, reason))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monorepo::forced::ForcePublish;
    use crate::monorepo::history::testing::FakeHistory;

    fn packages() -> Vec<Package> {
        vec![
            Package::new("core", "1.0.0", "/repo/packages/core"),
            Package::new("cli", "1.0.0", "/repo/packages/cli"),
        ]
    }

    fn graph() -> DependencyGraph {
        DependencyGraph::from_dependencies([("core", vec![]), ("cli", vec!["core"])])
    }

    fn names<'a>(updates: &'a [Update<'a>]) -> Vec<&'a str> {
        updates.iter().map(Update::name).collect()
    }

    #[test]
    fn test_core_change_pulls_in_cli() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &["packages/core/src/index.js"]);
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();

        assert_eq!(result.since.as_deref(), Some("v1.0.0"));
        assert_eq!(names(&result.updates), vec!["core", "cli"]);
        assert_eq!(result.updates[0].reason, UpdateReason::Changed);
        assert_eq!(
            result.updates[1].reason,
            UpdateReason::DependencyChanged("core".to_string())
        );
        assert!(result.sets.updated.contains_key("core"));
        assert!(result.sets.dependent.contains_key("cli"));
    }

    #[test]
    fn test_chain_marks_all_dependents() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &["c/lib.rs"]);
        let pkgs = vec![
            Package::new("a", "1.0.0", "/repo/a"),
            Package::new("b", "1.0.0", "/repo/b"),
            Package::new("c", "1.0.0", "/repo/c"),
        ];
        let graph =
            DependencyGraph::from_dependencies([("a", vec!["b"]), ("b", vec!["c"]), ("c", vec![])]);
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();
        assert!(result.sets.dependent.contains_key("a"));
        assert!(result.sets.dependent.contains_key("b"));
        assert_eq!(names(&result.updates), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nothing_changed() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &[]);
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_canary_includes_everything() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("01234567^..01234567", &[]);
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector
            .collect(&UpdateOptions::new().with_canary(true))
            .unwrap();
        assert_eq!(result.since.as_deref(), Some("01234567^..01234567"));
        assert_eq!(names(&result.updates), vec!["core", "cli"]);
        assert!(result.updates.iter().all(|u| u.reason == UpdateReason::Canary));
    }

    #[test]
    fn test_force_publish_true() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &[]);
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let options = UpdateOptions::new().with_force_publish(ForcePublish::Flag(true));
        let result = collector.collect(&options).unwrap();
        assert_eq!(result.sets.updated.len(), 2);
        assert!(result.updates.iter().all(|u| u.reason == UpdateReason::Forced));
        assert_eq!(history.diff_count(), 0);
    }

    #[test]
    fn test_no_tags_means_everything_changed() {
        let history = FakeHistory::new("/repo");
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();
        assert_eq!(result.since, None);
        assert_eq!(result.sets.updated.len(), 2);
        assert!(result.updates.iter().all(|u| u.reason == UpdateReason::Changed));
    }

    #[test]
    fn test_prerelease_dependency_pulls_in_dependents() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &[]);
        let pkgs = vec![
            Package::new("core", "2.0.0-beta.1", "/repo/packages/core"),
            Package::new("cli", "1.0.0", "/repo/packages/cli"),
        ];
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();
        assert_eq!(result.updates[0].reason, UpdateReason::Prerelease);
        assert_eq!(
            result.updates[1].reason,
            UpdateReason::DependencyChanged("core".to_string())
        );

        let result = collector
            .collect(&UpdateOptions::new().with_cd_version("prerelease"))
            .unwrap();
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_cyclic_graph_terminates() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &["packages/z/a.txt"]);
        let pkgs = vec![
            Package::new("a", "1.0.0", "/repo/packages/a"),
            Package::new("b", "1.0.0", "/repo/packages/b"),
            Package::new("z", "1.0.0", "/repo/packages/z"),
        ];
        let graph =
            DependencyGraph::from_dependencies([("a", vec!["b"]), ("b", vec!["a"]), ("z", vec![])]);
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);

        let result = collector.collect(&UpdateOptions::new()).unwrap();
        assert_eq!(names(&result.updates), vec!["z"]);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let history = FakeHistory::new("/repo")
            .with_tag("v1.0.0")
            .with_diff("v1.0.0", &["packages/core/src/index.js"]);
        let pkgs = packages();
        let graph = graph();
        let collector = UpdatedPackagesCollector::new(&history, "/repo", &pkgs, &graph);
        let options = UpdateOptions::new().with_ignore("*.md");

        let first = collector.collect(&options).unwrap().updates;
        let second = collector.collect(&options).unwrap().updates;
        assert_eq!(first, second);
    }

    #[test]
    fn test_targets_order() {
        let pkgs = vec![
            Package::new("pre", "1.0.0-rc.1", "pre"),
            Package::new("changed", "1.0.0", "changed"),
        ];
        let mut sets = ResultSets::default();
        sets.updated.insert("changed", &pkgs[1]);
        sets.prereleased.insert("pre", &pkgs[0]);

        assert_eq!(sets.targets(&pkgs), vec!["changed", "pre"]);
    }
}
