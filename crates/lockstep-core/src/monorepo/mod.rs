//! Changed-package detection for multi-package repositories
//!
//! Decides which packages need a new version for a coordinated release:
//! - Comparison point selection (latest tag, explicit ref, or canary range)
//! - Change detection from path-scoped diffs, with ignore globs and forced packages
//! - Prerelease detection
//! - Dependency closure over the workspace graph, safe on cycles
//! - Package discovery and graph construction from npm and Cargo manifests

use std::collections::BTreeMap;

use crate::types::Package;

pub mod changes;
pub mod closure;
pub mod discovery;
pub mod forced;
pub mod graph;
pub mod history;
pub mod options;
pub mod prerelease;
pub mod since;
pub mod updated;

pub use changes::{ChangeDetector, IgnoreFilter};
pub use closure::{ClosureCache, Dependent, DependencyClosure, Mark};
pub use discovery::{packages_of, DiscoveredPackage, PackageDiscovery};
pub use forced::{ForcePublish, ForcedSet};
pub use graph::{DependencyGraph, PackageNode};
pub use history::History;
pub use options::UpdateOptions;
pub use prerelease::{detect_prereleased, is_prerelease_bump};
pub use since::select_since;
pub use updated::{aggregate, ResultSets, UpdatedPackages, UpdatedPackagesCollector};

/// Packages keyed by name
pub type PackageMap<'a> = BTreeMap<&'a str, &'a Package>;
