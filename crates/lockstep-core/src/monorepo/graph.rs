//! Dependency graph for monorepo packages

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::discovery::DiscoveredPackage;

/// A node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageNode {
    /// Package name
    pub name: String,
    /// Direct dependencies, in the order given by the caller (sorted by discovery)
    pub dependencies: Vec<String>,
    /// Packages that directly depend on this package
    pub dependents: Vec<String>,
}

/// Dependency graph for workspace packages
///
/// Read-only once built. Cycles are recorded, not rejected.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes indexed by package name
    nodes: HashMap<String, PackageNode>,
    /// Circular dependencies detected
    cycles: Vec<Vec<String>>,
}

impl DependencyGraph {
    /// Build a dependency graph from discovered packages
    pub fn build(packages: &[DiscoveredPackage], include_dev: bool) -> Self {
        Self::from_dependencies(packages.iter().map(|pkg| {
            let mut deps = pkg.dependencies.clone();
            if include_dev {
                for dep in &pkg.dev_dependencies {
                    if !deps.contains(dep) {
                        deps.push(dep.clone());
                    }
                }
            }
            (pkg.package.name.clone(), deps)
        }))
    }

    /// Build a graph from `(name, direct dependencies)` pairs
    pub fn from_dependencies<I, N, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut nodes: HashMap<String, PackageNode> = HashMap::new();

        for (name, deps) in entries {
            let name = name.into();
            nodes.insert(
                name.clone(),
                PackageNode {
                    name,
                    dependencies: deps.into_iter().map(Into::into).collect(),
                    dependents: Vec::new(),
                },
            );
        }

        // Build reverse dependency mapping (dependents)
        let mut names: Vec<String> = nodes.keys().cloned().collect();
        names.sort();
        for name in &names {
            let deps = nodes[name].dependencies.clone();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        let cycles = Self::detect_cycles(&nodes);
        if !cycles.is_empty() {
            let cycle_desc: Vec<String> = cycles.iter().map(|c| c.join(" -> ")).collect();
            warn!(cycles = %cycle_desc.join("; "), "circular dependencies detected");
        }
        debug!(nodes = nodes.len(), "built dependency graph");

        Self { nodes, cycles }
    }

    /// Find nodes that Kahn's algorithm cannot order, then extract the cycles among them
    fn detect_cycles(nodes: &HashMap<String, PackageNode>) -> Vec<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut ordered: HashSet<&str> = HashSet::new();

        for (name, node) in nodes {
            let degree = node
                .dependencies
                .iter()
                .filter(|d| nodes.contains_key(*d))
                .count();
            in_degree.insert(name.as_str(), degree);
            if degree == 0 {
                queue.push_back(name.as_str());
            }
        }

        while let Some(name) = queue.pop_front() {
            ordered.insert(name);
            for dependent in &nodes[name].dependents {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        let mut cyclic: Vec<&str> = nodes
            .keys()
            .map(String::as_str)
            .filter(|n| !ordered.contains(n))
            .collect();
        cyclic.sort_unstable();

        let mut cycles: Vec<Vec<String>> = Vec::new();
        for start in &cyclic {
            if let Some(cycle) = Self::find_cycle(nodes, start, &cyclic) {
                if !cycles
                    .iter()
                    .any(|c| c.len() == cycle.len() && cycle.iter().all(|n| c.contains(n)))
                {
                    cycles.push(cycle);
                }
            }
        }
        cycles
    }

    /// Find a cycle through `start`, walking only cyclic nodes
    fn find_cycle(
        nodes: &HashMap<String, PackageNode>,
        start: &str,
        cyclic: &[&str],
    ) -> Option<Vec<String>> {
        fn dfs(
            nodes: &HashMap<String, PackageNode>,
            current: &str,
            start: &str,
            visited: &mut HashSet<String>,
            path: &mut Vec<String>,
            cyclic: &[&str],
        ) -> bool {
            if visited.contains(current) {
                return current == start && path.len() > 1;
            }
            if !cyclic.contains(&current) {
                return false;
            }

            visited.insert(current.to_string());
            path.push(current.to_string());

            if let Some(node) = nodes.get(current) {
                for dep in &node.dependencies {
                    if dep == start && !path.is_empty() {
                        return true;
                    }
                    if dfs(nodes, dep, start, visited, path, cyclic) {
                        return true;
                    }
                }
            }

            path.pop();
            false
        }

        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if dfs(nodes, start, start, &mut visited, &mut path, cyclic) {
            Some(path)
        } else {
            None
        }
    }

    /// Direct dependencies of a package; empty for unknown names
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Packages that directly depend on a package
    pub fn dependents(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Get a package node
    pub fn get(&self, name: &str) -> Option<&PackageNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if there are any circular dependencies
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Get detected circular dependencies
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }
}
