//! Change detection for monorepos

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::types::Package;

use super::forced::ForcedSet;
use super::history::History;
use super::PackageMap;

/// Globs for changed files that never make a package changed
///
/// A file is ignored when any pattern matches either its package-relative
/// path or its file name alone, so `*.md` also ignores `docs/guide.md`.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreFilter {
    /// Compile ignore patterns
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for (i, pattern) in patterns.iter().enumerate() {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ConfigError::InvalidValue {
                    field: format!("changes.ignore[{}]", i),
                    message: e.kind().to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "changes.ignore".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    /// A filter that ignores nothing
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// Check if a package-relative file should be ignored
    pub fn is_ignored(&self, file: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        self.set.is_match(file)
            || file
                .file_name()
                .is_some_and(|name| self.set.is_match(Path::new(name)))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::empty()
    }
}

/// Decides which packages have qualifying changes since a history point
pub struct ChangeDetector<'h, H: History> {
    history: &'h H,
    /// Repository root that diff paths are relative to
    root: PathBuf,
    ignore: IgnoreFilter,
}

impl<'h, H: History> ChangeDetector<'h, H> {
    /// Create a new change detector
    pub fn new(history: &'h H, root: impl Into<PathBuf>) -> Self {
        Self {
            history,
            root: root.into(),
            ignore: IgnoreFilter::empty(),
        }
    }

    /// Set the ignore filter
    pub fn with_ignore(mut self, ignore: IgnoreFilter) -> Self {
        self.ignore = ignore;
        self
    }

    /// Collect every package with a qualifying change
    pub fn detect<'p>(
        &self,
        packages: &'p [Package],
        since: Option<&str>,
        forced: &ForcedSet,
    ) -> Result<PackageMap<'p>> {
        debug!(
            packages = packages.len(),
            since = ?since,
            forced = %forced.iter().collect::<Vec<_>>().join(","),
            ignore = self.ignore.patterns().len(),
            "detecting changed packages"
        );

        let mut updated = PackageMap::new();
        for pkg in packages {
            if self.is_changed(pkg, since, forced)? {
                updated.insert(pkg.name.as_str(), pkg);
            }
        }

        info!(changed_packages = updated.len(), "change detection complete");
        Ok(updated)
    }

    /// Whether a single package has a qualifying change
    pub fn is_changed(&self, pkg: &Package, since: Option<&str>, forced: &ForcedSet) -> Result<bool> {
        let since = match since {
            Some(since) if !forced.is_all() => since,
            _ => {
                debug!(package = %pkg.name, "no comparison point or all forced");
                return Ok(true);
            }
        };

        if forced.contains(&pkg.name) {
            debug!(package = %pkg.name, "forced");
            return Ok(true);
        }

        let changed_files = self.history.diff_since(since, &pkg.location)?;
        if changed_files.is_empty() {
            debug!(package = %pkg.name, "no changed files");
            return Ok(false);
        }

        let package_dir = pkg
            .location
            .strip_prefix(&self.root)
            .unwrap_or(&pkg.location);

        let remaining: Vec<&Path> = changed_files
            .iter()
            .map(|file| {
                let file = Path::new(file);
                file.strip_prefix(package_dir).unwrap_or(file)
            })
            .filter(|file| !self.ignore.is_ignored(file))
            .collect();

        debug!(
            package = %pkg.name,
            changed = changed_files.len(),
            qualifying = remaining.len(),
            "diffed package"
        );
        Ok(!remaining.is_empty())
    }
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

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_ignore_filter_matches_basename() {
        let filter = IgnoreFilter::new(&patterns(&["*.md"])).unwrap();
        assert!(filter.is_ignored(Path::new("README.md")));
        assert!(filter.is_ignored(Path::new("docs/guide.md")));
        assert!(!filter.is_ignored(Path::new("src/lib.rs")));
    }

    #[test]
    fn test_ignore_filter_matches_relative_path() {
        let filter = IgnoreFilter::new(&patterns(&["test/**"])).unwrap();
        assert!(filter.is_ignored(Path::new("test/fixtures/a.json")));
        assert!(!filter.is_ignored(Path::new("src/test.rs")));
    }

    #[test]
    fn test_ignore_filter_rejects_bad_glob() {
        assert!(IgnoreFilter::new(&patterns(&["src/["])).is_err());
    }

    #[test]
    fn test_no_since_marks_everything_without_diffing() {
        let history = FakeHistory::new("/repo");
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo");

        let updated = detector.detect(&pkgs, None, &ForcedSet::default()).unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(history.diff_count(), 0);
    }

    #[test]
    fn test_wildcard_marks_everything_without_diffing() {
        let history = FakeHistory::new("/repo").with_diff("v1.0.0", &[]);
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo");
        let forced = ForcedSet::resolve(Some(&ForcePublish::Names("*".to_string())));

        let updated = detector.detect(&pkgs, Some("v1.0.0"), &forced).unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(history.diff_count(), 0);
    }

    #[test]
    fn test_named_force_with_empty_diff() {
        let history = FakeHistory::new("/repo").with_diff("v1.0.0", &[]);
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo");
        let forced = ForcedSet::resolve(Some(&ForcePublish::Names("core,cli".to_string())));

        let updated = detector.detect(&pkgs, Some("v1.0.0"), &forced).unwrap();
        assert!(updated.contains_key("core"));
        assert!(updated.contains_key("cli"));
    }

    #[test]
    fn test_diff_scoped_to_package() {
        let history = FakeHistory::new("/repo")
            .with_diff("v1.0.0", &["packages/core/src/lib.rs", "README.md"]);
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo");

        let updated = detector
            .detect(&pkgs, Some("v1.0.0"), &ForcedSet::default())
            .unwrap();
        assert_eq!(updated.keys().copied().collect::<Vec<_>>(), vec!["core"]);
    }

    #[test]
    fn test_ignored_file_does_not_count() {
        let history = FakeHistory::new("/repo")
            .with_diff("v1.0.0", &["packages/core/CHANGELOG.md"]);
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo")
            .with_ignore(IgnoreFilter::new(&patterns(&["*.md"])).unwrap());

        let updated = detector
            .detect(&pkgs, Some("v1.0.0"), &ForcedSet::default())
            .unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_unignored_file_in_same_dir_counts() {
        let history = FakeHistory::new("/repo").with_diff(
            "v1.0.0",
            &["packages/core/CHANGELOG.md", "packages/core/index.js"],
        );
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo")
            .with_ignore(IgnoreFilter::new(&patterns(&["*.md"])).unwrap());

        let updated = detector
            .detect(&pkgs, Some("v1.0.0"), &ForcedSet::default())
            .unwrap();
        assert!(updated.contains_key("core"));
    }

    #[test]
    fn test_ignore_matches_package_relative_path() {
        // "src/*.snap" only matches once the package prefix is stripped
        let history = FakeHistory::new("/repo")
            .with_diff("v1.0.0", &["packages/core/src/output.snap"]);
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo")
            .with_ignore(IgnoreFilter::new(&patterns(&["src/*.snap"])).unwrap());

        let updated = detector
            .detect(&pkgs, Some("v1.0.0"), &ForcedSet::default())
            .unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_diff_errors_propagate() {
        let history = FakeHistory::new("/repo");
        let pkgs = packages();
        let detector = ChangeDetector::new(&history, "/repo");

        assert!(detector
            .detect(&pkgs, Some("missing"), &ForcedSet::default())
            .is_err());
    }
}
