//! `History` backed by a git repository

use std::path::Path;

use lockstep_core::History;

use crate::repository::GitRepo;

impl History for GitRepo {
    fn has_tags(&self) -> lockstep_core::Result<bool> {
        Ok(GitRepo::has_tags(self)?)
    }

    fn current_revision(&self) -> lockstep_core::Result<String> {
        Ok(GitRepo::current_revision(self)?)
    }

    fn latest_tag(&self) -> lockstep_core::Result<String> {
        Ok(GitRepo::latest_tag(self)?)
    }

    fn diff_since(&self, range: &str, location: &Path) -> lockstep_core::Result<Vec<String>> {
        Ok(GitRepo::diff_since(self, range, location)?)
    }
}
