//! Path-scoped diffs

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use git2::{Diff, DiffOptions, Tree};
use tracing::{debug, instrument};

use lockstep_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Files changed under `location` since `range`
    ///
    /// A single revision is compared against the working tree and index, so
    /// uncommitted edits count. An `A..B` range compares the two trees.
    /// Paths are relative to the repository root, sorted and deduplicated.
    #[instrument(skip(self), fields(location = %location.display()))]
    pub fn diff_since(&self, range: &str, location: &Path) -> Result<Vec<String>> {
        let mut opts = DiffOptions::new();
        if let Some(spec) = self.pathspec(location) {
            debug!(pathspec = %spec, "scoping diff");
            opts.pathspec(spec);
        }

        let diff = if range.contains("..") {
            let (from, to) = self.resolve_range(range)?;
            self.repo
                .diff_tree_to_tree(Some(&from), Some(&to), Some(&mut opts))?
        } else {
            let tree = self.resolve_tree(range)?;
            self.repo
                .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))?
        };

        let files = changed_paths(&diff);
        debug!(range, files = files.len(), "diffed");
        Ok(files)
    }

    fn resolve_tree(&self, rev: &str) -> Result<Tree<'_>> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|_| GitError::InvalidRevision(rev.to_string()))?;
        Ok(object.peel_to_tree()?)
    }

    fn resolve_range(&self, range: &str) -> Result<(Tree<'_>, Tree<'_>)> {
        let invalid = || GitError::InvalidRevision(range.to_string());
        let spec = self.repo.revparse(range).map_err(|_| invalid())?;
        let from = spec.from().ok_or_else(invalid)?.peel_to_tree()?;
        let to = spec.to().ok_or_else(invalid)?.peel_to_tree()?;
        Ok((from, to))
    }

    /// Location as a git pathspec, or None when it is the repository root
    fn pathspec(&self, location: &Path) -> Option<String> {
        let relative = match self.workdir() {
            Some(workdir) => relative_to(location, workdir),
            None => location.to_path_buf(),
        };

        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

/// Strip the workdir from an absolute location, tolerating symlinked temp paths
fn relative_to(location: &Path, workdir: &Path) -> PathBuf {
    if location.is_relative() {
        return location.to_path_buf();
    }
    if let Ok(rel) = location.strip_prefix(workdir) {
        return rel.to_path_buf();
    }
    match (location.canonicalize(), workdir.canonicalize()) {
        (Ok(location), Ok(workdir)) => location
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .unwrap_or(location),
        _ => location.to_path_buf(),
    }
}

fn changed_paths(diff: &Diff<'_>) -> Vec<String> {
    let mut files = BTreeSet::new();
    for delta in diff.deltas() {
        let path = delta.new_file().path().or_else(|| delta.old_file().path());
        if let Some(path) = path {
            // git reports '/' separated paths; rebuild with the platform separator
            let native: PathBuf = path.components().collect();
            files.insert(native.to_string_lossy().into_owned());
        }
    }
    files.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestRepo;
    use crate::GitRepo;
    use lockstep_core::error::GitError;

    fn fixture() -> TestRepo {
        let fixture = TestRepo::new();
        fixture.write("packages/core/src/lib.rs", "pub fn core() {}");
        fixture.write("packages/cli/src/main.rs", "fn main() {}");
        fixture.commit_paths(
            &["packages/core/src/lib.rs", "packages/cli/src/main.rs"],
            "initial",
        );
        fixture.tag("v1.0.0");
        fixture
    }

    #[test]
    fn test_diff_clean_tree() {
        let fixture = fixture();
        let repo = GitRepo::open(fixture.path()).unwrap();
        let files = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/core"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_diff_scoped_to_location() {
        let fixture = fixture();
        fixture.commit_file("packages/core/src/lib.rs", "pub fn core2() {}", "change core");
        let repo = GitRepo::open(fixture.path()).unwrap();

        let core = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/core"))
            .unwrap();
        assert_eq!(core, vec!["packages/core/src/lib.rs".to_string()]);

        let cli = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/cli"))
            .unwrap();
        assert!(cli.is_empty());
    }

    #[test]
    fn test_diff_sibling_prefix_not_matched() {
        let fixture = fixture();
        fixture.commit_file("packages/core-extra/index.js", "x", "sibling");
        let repo = GitRepo::open(fixture.path()).unwrap();

        let core = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/core"))
            .unwrap();
        assert!(core.is_empty());
    }

    #[test]
    fn test_diff_includes_uncommitted_changes() {
        let fixture = fixture();
        fixture.write("packages/cli/src/main.rs", "fn main() { run() }");
        let repo = GitRepo::open(fixture.path()).unwrap();

        let cli = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/cli"))
            .unwrap();
        assert_eq!(cli, vec!["packages/cli/src/main.rs".to_string()]);
    }

    #[test]
    fn test_diff_reports_deleted_files() {
        let fixture = fixture();
        std::fs::remove_file(fixture.path().join("packages/core/src/lib.rs")).unwrap();
        let repo = GitRepo::open(fixture.path()).unwrap();

        let core = repo
            .diff_since("v1.0.0", &fixture.path().join("packages/core"))
            .unwrap();
        assert_eq!(core, vec!["packages/core/src/lib.rs".to_string()]);
    }

    #[test]
    fn test_diff_range_ignores_workdir() {
        let fixture = fixture();
        let head = fixture.commit_file("packages/core/src/lib.rs", "pub fn v2() {}", "change core");
        fixture.write("packages/cli/src/main.rs", "fn main() { dirty() }");
        let repo = GitRepo::open(fixture.path()).unwrap();

        let sha = &head.to_string()[..8];
        let range = format!("{}^..{}", sha, sha);

        let core = repo
            .diff_since(&range, &fixture.path().join("packages/core"))
            .unwrap();
        assert_eq!(core, vec!["packages/core/src/lib.rs".to_string()]);

        let cli = repo
            .diff_since(&range, &fixture.path().join("packages/cli"))
            .unwrap();
        assert!(cli.is_empty());
    }

    #[test]
    fn test_diff_relative_location() {
        let fixture = fixture();
        fixture.commit_file("packages/cli/README.md", "docs", "docs");
        let repo = GitRepo::open(fixture.path()).unwrap();

        let cli = repo
            .diff_since("v1.0.0", std::path::Path::new("packages/cli"))
            .unwrap();
        assert_eq!(cli, vec!["packages/cli/README.md".to_string()]);
    }

    #[test]
    fn test_diff_invalid_revision() {
        let fixture = fixture();
        let repo = GitRepo::open(fixture.path()).unwrap();

        let result = repo.diff_since("does-not-exist", fixture.path());
        assert!(matches!(result, Err(GitError::InvalidRevision(rev)) if rev == "does-not-exist"));
    }
}
