//! Version-control collaborator used by change detection

use std::path::Path;

use crate::error::Result;

/// Read-only view of repository history
///
/// Implemented by `lockstep_git::GitRepo`. Errors are never handled by the
/// decision engine; they propagate to the caller.
pub trait History {
    /// Whether the repository has any tags
    fn has_tags(&self) -> Result<bool>;

    /// Full identifier of the current revision
    fn current_revision(&self) -> Result<String>;

    /// Most recent tag reachable from the current revision
    fn latest_tag(&self) -> Result<String>;

    /// Files changed under `location` since `range`, relative to the repository root
    ///
    /// `range` is either a single revision (compared against the working tree)
    /// or an `A..B` range. Returns an empty list when nothing changed.
    fn diff_since(&self, range: &str, location: &Path) -> Result<Vec<String>>;
}
